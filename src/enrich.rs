use tracing::{debug, info, warn};

use crate::annotate::{display_name, Annotator, Profile};
use crate::decoder::{DecodeError, Decoder, Templates, VariantRef};
use crate::instructions::{Instruction, InstructionGroup};
use crate::report::{Diagnostic, EnrichReport};

/// Decodes every variant and annotates every text field of a database.
pub struct Enricher<'a, D: Decoder> {
    decoder: &'a D,
    annotator: &'a Annotator,
}

impl<'a, D: Decoder> Enricher<'a, D> {
    pub fn new(decoder: &'a D, annotator: &'a Annotator) -> Self {
        Self { decoder, annotator }
    }

    /// Stops at the first fatal error; earlier groups stay enriched.
    pub fn run(&self, groups: &mut [InstructionGroup]) -> Result<EnrichReport, DecodeError> {
        let mut report = EnrichReport {
            groups: groups.len(),
            ..Default::default()
        };
        for group in groups.iter_mut() {
            debug!(title = %group.title, "enriching group");
            for insn in group.instructions.iter_mut() {
                self.instruction(insn, &mut report)?;
            }
        }
        info!(
            groups = report.groups,
            instructions = report.instructions,
            variants = report.variants,
            warnings = report.warnings(),
            "database enriched"
        );
        Ok(report)
    }

    fn annotate(
        &self,
        text: &mut String,
        profile: Profile,
        field: &'static str,
        mnemonic: &str,
        at: Option<&VariantRef>,
        report: &mut EnrichReport,
    ) {
        let a = self.annotator.annotate(text, profile);
        if let Some(e) = a.skipped {
            let d = Diagnostic::SkippedPass {
                mnemonic: mnemonic.to_string(),
                at: at.cloned(),
                field,
                pass: "pattern substitution",
                error: e.to_string(),
            };
            warn!("{d}");
            report.diagnostics.push(d);
        }
        *text = a.text;
    }

    fn instruction(&self, insn: &mut Instruction, report: &mut EnrichReport) -> Result<(), DecodeError> {
        report.instructions += 1;
        insn.name = display_name(&insn.origin);

        for variant in insn.variants.iter_mut() {
            let abstract_text = variant.abstract_text.as_deref().unwrap_or(&insn.abstract_text);
            let text = Templates {
                abstract_text,
                name: &insn.name,
                summary: &insn.summary,
            };
            let out = self.decoder.decode(&insn.mnemonic, variant, text)?;
            for d in out.diagnostics {
                warn!("{d}");
                report.diagnostics.push(d);
            }

            let at = VariantRef::new(&insn.mnemonic, variant);
            let mut decoded = out.decoded;
            self.annotate(&mut decoded.abstract_text, Profile::Expression, "abstract", &insn.mnemonic, Some(&at), report);
            if let Some(op) = decoded.operand.as_mut() {
                self.annotate(op, Profile::Expression, "operand", &insn.mnemonic, Some(&at), report);
            }
            self.annotate(&mut decoded.summary, Profile::Prose, "summary", &insn.mnemonic, Some(&at), report);
            variant.decoded = Some(decoded);
            report.variants += 1;
        }

        let mnemonic = insn.mnemonic.clone();
        self.annotate(&mut insn.description, Profile::Prose, "description", &mnemonic, None, report);
        self.annotate(&mut insn.summary, Profile::Prose, "summary", &mnemonic, None, report);
        self.annotate(&mut insn.note, Profile::Prose, "note", &mnemonic, None, report);
        for expr in insn.flags.expressions_mut() {
            self.annotate(expr, Profile::Expression, "flags", &mnemonic, None, report);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Cpus;
    use crate::instructions::AddrMode::*;
    use crate::instructions::Variant;
    use crate::isa::m65::M65Decoder;
    use pretty_assertions::assert_eq;

    fn lda() -> InstructionGroup {
        InstructionGroup::new(
            "Data transfer",
            vec![Instruction::new("LDA", "_Loa_d _Accumulator")
                .abstract_text("A = MEM")
                .summary("loads the accumulator")
                .variant(Variant::new(Cpus::FAMILY, 0xA9, 2, 2, Immediate))
                .variant(Variant::new(Cpus::FAMILY, 0xB1, 2, 7, ZeroPage | Indirect | YIndexed))
                .flags(crate::flags!["MEM:7", -, 0, -, -, -, "MEM == 0", -])],
        )
    }

    #[test]
    fn fills_decoded_and_annotated_fields() {
        let mut groups = vec![lda()];
        let decoder = M65Decoder::new();
        let annotator = Annotator::default();
        let report = Enricher::new(&decoder, &annotator).run(&mut groups).unwrap();
        assert_eq!((report.instructions, report.variants, report.warnings()), (1, 2, 0));

        let insn = &groups[0].instructions[0];
        assert_eq!(insn.name, "<em>L</em>oa<em>d</em> <em>A</em>ccumulator");
        let d = insn.variants[1].decoded.as_ref().unwrap();
        assert_eq!(d.syntax, "LDA ($ZZ),Y");
        assert_eq!(d.name, insn.name);
        assert!(d.abstract_text.starts_with(r#"<abbr title="Accumulator register">A</abbr>"#));
        assert!(d.operand.as_deref().unwrap().starts_with(r#"<var title="Byte at 16-bit address (indexed)"#));

        let flags: Vec<_> = insn.flags.expressions().map(|(c, _)| c).collect();
        assert_eq!(flags, vec!['N', 'Z']);
        assert_eq!(
            insn.flags.expressions().next().unwrap().1,
            r#"<abbr title="Memory, bit 7">MEM<sub>7</sub></abbr>"#
        );
    }

    #[test]
    fn cycle_mismatch_is_reported_not_fatal() {
        let mut groups = vec![InstructionGroup::new(
            "Branching",
            vec![Instruction::new("BRA", "_B_Ranch _Always")
                .variant(Variant::new(Cpus::CMOS, 0x80, 2, 4, Relative))],
        )];
        let decoder = M65Decoder::new();
        let annotator = Annotator::default();
        let report = Enricher::new(&decoder, &annotator).run(&mut groups).unwrap();
        assert_eq!(report.warnings(), 1);
        assert!(matches!(report.diagnostics[0], Diagnostic::CycleMismatch { declared: 4, decoded: 2, .. }));
    }

    #[test]
    fn byte_mismatch_aborts_the_run() {
        let mut groups = vec![InstructionGroup::new(
            "Data transfer",
            vec![Instruction::new("LDA", "_Loa_d _Accumulator")
                .variant(Variant::new(Cpus::FAMILY, 0xAD, 2, 5, Absolute))],
        )];
        let decoder = M65Decoder::new();
        let annotator = Annotator::default();
        let err = Enricher::new(&decoder, &annotator).run(&mut groups).unwrap_err();
        assert!(matches!(err, DecodeError::ByteCountMismatch { declared: 2, decoded: 3, .. }));
    }
}
