use std::fmt::Write as _;

use opref_rs::Cpus;

use crate::rows::{Row, Section};

#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    /// Written once into the page header; the crate version unless overridden.
    pub timestamp: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: "HuC6280 / 65C02 / 6502 Opcode Reference".to_string(),
            timestamp: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

const COLUMNS: [&str; 7] = [
    "Syntax",
    "Abstract",
    "Machine Code",
    "Flags<br>NVTBDIZC",
    "Address Mode",
    "Bytes",
    "Cycles",
];

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Annotated text keeps its markup; line breaks and tabs become page layout.
fn multiline(s: &str) -> String {
    s.replace('\t', "&emsp;").replace('\n', "<br>\n")
}

fn write_row(out: &mut String, r: &Row) {
    let _ = writeln!(out, r#"<tr id="{}" class="{}">"#, r.id, r.cpus.join(" "));
    let _ = writeln!(out, "  <td>{}</td>", escape(&r.syntax));
    let _ = writeln!(out, "  <td>{}</td>", multiline(&r.abstract_text));
    let _ = writeln!(out, r#"  <td id="{}">{}</td>"#, r.machine_id, r.machine_code);
    let _ = writeln!(out, "  <td>{}</td>", r.flags);
    let _ = writeln!(out, "  <td>{}</td>", r.mode);
    let _ = writeln!(out, "  <td>{}</td>", r.bytes);
    let _ = writeln!(out, "  <td>{}</td>", escape(&r.cycles));
    let _ = writeln!(out, "</tr>");
    if r.details.is_empty() {
        return;
    }
    let _ = writeln!(out, r#"<tr class="details {}"><td colspan="{}">"#, r.cpus.join(" "), COLUMNS.len());
    for d in &r.details {
        let _ = writeln!(out, "  <details><summary>{}</summary>", d.heading);
        let _ = writeln!(out, "  <p>{}</p></details>", multiline(&d.body));
    }
    let _ = writeln!(out, "</td></tr>");
}

pub fn render_page(sections: &[Section], opts: &PageOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{}</title>", escape(&opts.title));
    let _ = writeln!(out, "</head>\n<body>");
    let _ = writeln!(out, "<h1>{}</h1>", escape(&opts.title));
    let _ = writeln!(out, r#"<p class="timestamp">Generated {}</p>"#, escape(&opts.timestamp));

    let _ = writeln!(out, r#"<form class="cpu-filter">"#);
    for (_, name) in Cpus::NAMES {
        let _ = writeln!(
            out,
            r#"  <label><input type="checkbox" value="{name}" checked>{name}</label>"#
        );
    }
    let _ = writeln!(out, "</form>");

    let _ = writeln!(out, "<table>");
    let header: String = COLUMNS.iter().map(|c| format!("<th>{c}</th>")).collect();
    let _ = writeln!(out, "<thead><tr>{header}</tr></thead>");
    for s in sections {
        let _ = writeln!(out, "<tbody>");
        let _ = writeln!(
            out,
            r#"<tr class="section"><th colspan="{}">{}</th></tr>"#,
            COLUMNS.len(),
            escape(&s.title)
        );
        for r in &s.rows {
            write_row(&mut out, r);
        }
        let _ = writeln!(out, "</tbody>");
    }
    let _ = writeln!(out, "</table>\n</body>\n</html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_carries_title_timestamp_and_filters() {
        let opts = PageOptions { title: "T & U".into(), timestamp: "2024-01-01".into() };
        let page = render_page(&[], &opts);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>T &amp; U</title>"));
        assert!(page.contains("Generated 2024-01-01"));
        for (_, name) in Cpus::NAMES {
            assert!(page.contains(&format!(r#"value="{name}""#)), "{name}");
        }
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn default_timestamp_is_deterministic() {
        assert_eq!(PageOptions::default().timestamp, env!("CARGO_PKG_VERSION"));
    }
}
