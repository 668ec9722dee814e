use std::collections::HashSet;

use pretty_assertions::assert_eq;

use opref_html::{render_page, sections, PageOptions};
use opref_rs::enriched_database;

#[test]
fn lda_renders_nine_distinct_rows() {
    let (groups, _) = enriched_database().unwrap();
    let sections = sections(&groups);
    let data = sections
        .iter()
        .find(|s| s.title == "Data Transfer Operations")
        .unwrap();
    let lda: Vec<_> = data.rows.iter().filter(|r| r.syntax.starts_with("LDA")).collect();
    assert_eq!(lda.len(), 9);

    let machine: HashSet<_> = lda.iter().map(|r| r.machine_code.as_str()).collect();
    let modes: HashSet<_> = lda.iter().map(|r| r.mode.as_str()).collect();
    assert_eq!(machine.len(), 9);
    assert_eq!(modes.len(), 9);
    assert!(lda.iter().all(|r| r.flags == "N-0---Z-"));

    let post_indexed = lda.iter().find(|r| r.machine_code == "B1 ZZ").unwrap();
    assert_eq!(post_indexed.syntax, "LDA ($ZZ),Y");
    assert_eq!(post_indexed.mode, "Zero Page, Indirect, Y-Indexed");
    assert_eq!(post_indexed.machine_id, "codeB1ZZ");
}

#[test]
fn row_ids_are_sequential_across_sections() {
    let (groups, report) = enriched_database().unwrap();
    let rows: Vec<_> = sections(&groups).into_iter().flat_map(|s| s.rows).collect();
    assert_eq!(rows.len(), report.variants);
    for (i, r) in rows.iter().enumerate() {
        assert_eq!(r.id, format!("row{i}"));
    }
}

#[test]
fn block_rows_show_the_cost_formula() {
    let (groups, _) = enriched_database().unwrap();
    let rows: Vec<_> = sections(&groups).into_iter().flat_map(|s| s.rows).collect();
    let tii = rows.iter().find(|r| r.syntax.starts_with("TII")).unwrap();
    assert_eq!(tii.cycles, "17 + 6 * $LHLL");
    assert_eq!(tii.bytes, 7);
    assert_eq!(tii.cpus, vec!["HuC6280"]);
}

#[test]
fn page_is_deterministic_for_a_fixed_timestamp() {
    let (groups, _) = enriched_database().unwrap();
    let sections = sections(&groups);
    let opts = PageOptions { timestamp: "fixed".into(), ..PageOptions::default() };
    let a = render_page(&sections, &opts);
    let b = render_page(&sections, &opts);
    assert_eq!(a, b);
    assert!(a.contains(r#"<tr id="row0""#));
    assert!(a.contains("Generated fixed"));
}

#[test]
fn json_output_round_trips_through_serde_json() {
    let (groups, _) = enriched_database().unwrap();
    let json = serde_json::to_string(&sections(&groups)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v.as_array().unwrap().len(), groups.len());
    assert_eq!(v[0]["title"], "Branching Operations");
}
