use serde::Serialize;

use opref_rs::{Instruction, InstructionGroup, Variant};

/// One collapsible block under a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    pub heading: String,
    pub body: String,
}

/// One table row per opcode variant.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub id: String,
    pub cpus: Vec<&'static str>,
    pub syntax: String,
    pub abstract_text: String,
    pub machine_code: String,
    pub machine_id: String,
    pub flags: String,
    pub mode: String,
    pub bytes: u8,
    pub cycles: String,
    pub details: Vec<Detail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub rows: Vec<Row>,
}

fn detail(heading: &str, body: &str) -> Option<Detail> {
    (!body.is_empty()).then(|| Detail {
        heading: heading.to_string(),
        body: body.to_string(),
    })
}

fn row(n: usize, insn: &Instruction, v: &Variant) -> Option<Row> {
    let d = v.decoded.as_ref()?;
    let flags_body = insn
        .flags
        .expressions()
        .map(|(letter, expr)| format!("{letter}: {expr}"))
        .collect::<Vec<_>>()
        .join("\n");
    let details = [
        detail(&d.name, &insn.description),
        detail("Summary", &d.summary),
        detail("Operand", d.operand.as_deref().unwrap_or_default()),
        detail("Flags", &flags_body),
        detail("Note", &insn.note),
    ]
    .into_iter()
    .flatten()
    .collect();

    Some(Row {
        id: format!("row{n}"),
        cpus: v.cpus.names().collect(),
        syntax: d.syntax.clone(),
        abstract_text: d.abstract_text.clone(),
        machine_code: d.machine_code.clone(),
        machine_id: format!("code{}", d.machine_code.split_whitespace().collect::<String>()),
        flags: insn.flags.cell(),
        mode: d.mode_label.clone(),
        bytes: d.bytes,
        cycles: d.cost.to_string(),
        details,
    })
}

/// Rows of an enriched database in page order. Variants that were never decoded are left out.
pub fn sections(groups: &[InstructionGroup]) -> Vec<Section> {
    let mut n = 0;
    groups
        .iter()
        .map(|g| {
            let mut rows = Vec::new();
            for insn in &g.instructions {
                for v in &insn.variants {
                    if let Some(r) = row(n, insn, v) {
                        rows.push(r);
                        n += 1;
                    }
                }
            }
            Section { title: g.title.clone(), rows }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opref_rs::instructions::AddrMode::*;
    use opref_rs::{Cpus, Enricher, Annotator};
    use opref_rs::isa::m65::M65Decoder;

    #[test]
    fn empty_details_are_omitted() {
        let mut groups = vec![InstructionGroup::new(
            "Misc",
            vec![Instruction::new("NOP", "_No _O_peration")
                .description("Does nothing.")
                .variant(Variant::new(Cpus::FAMILY, 0xEA, 1, 2, Implied))],
        )];
        let decoder = M65Decoder::new();
        let annotator = Annotator::default();
        Enricher::new(&decoder, &annotator).run(&mut groups).unwrap();

        let s = sections(&groups);
        let r = &s[0].rows[0];
        assert_eq!(r.id, "row0");
        assert_eq!(r.machine_id, "codeEA");
        assert_eq!(r.flags, "--------");
        assert_eq!(r.details.len(), 1);
        assert_eq!(r.details[0].heading, "<em>N</em>o <em>Op</em>eration");
        assert_eq!(r.details[0].body, "Does nothing.");
    }
}
