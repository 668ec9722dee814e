//! Splits annotated text into plain-text runs and markup runs.
//!
//! A markup run is either a complete element (opening tag through the
//! matching closing tag) or a tag that stands alone. Only the elements the
//! annotator emits count as markup; any other `<` is text and gets escaped.
//! Every annotation pass rewrites text runs only, so whatever a previous
//! pass tagged is never tagged again.

/// Elements produced by the annotator and the display-name rule.
pub const ELEMENTS: [&str; 4] = ["var", "abbr", "sub", "em"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Text,
    Markup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub kind: RunKind,
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn is_text(&self) -> bool {
        self.kind == RunKind::Text
    }

    pub fn slice<'a>(&self, s: &'a str) -> &'a str {
        &s[self.start..self.end]
    }
}

struct Tag<'a> {
    name: &'a str,
    end: usize,
    closing: bool,
    self_closing: bool,
}

/// Parses a tag of one of the [`ELEMENTS`] starting at `at` (which must hold `<`).
fn tag_at(s: &str, at: usize) -> Option<Tag<'_>> {
    let b = s.as_bytes();
    let mut i = at + 1;
    let closing = b.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }
    let name_start = i;
    while i < b.len() && (b[i].is_ascii_alphanumeric() || b[i] == b'-') {
        i += 1;
    }
    if i == name_start || !b[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = &s[name_start..i];
    if !ELEMENTS.contains(&name) || !matches!(b.get(i), Some(b' ' | b'>' | b'/')) {
        return None;
    }
    let mut quoted = false;
    while i < b.len() {
        match b[i] {
            b'"' => quoted = !quoted,
            b'>' if !quoted => {
                return Some(Tag {
                    name,
                    end: i + 1,
                    closing,
                    self_closing: b[i - 1] == b'/',
                });
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// End of the element opened by a tag named `name` whose opening tag ends at `from`.
fn element_end(s: &str, name: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = from;
    while let Some(off) = s[i..].find('<') {
        let at = i + off;
        match tag_at(s, at) {
            Some(t) => {
                if t.name == name && !t.self_closing {
                    if t.closing {
                        depth -= 1;
                        if depth == 0 {
                            return Some(t.end);
                        }
                    } else {
                        depth += 1;
                    }
                }
                i = t.end;
            }
            None => i = at + 1,
        }
    }
    None
}

pub fn runs(s: &str) -> Vec<Run> {
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while let Some(off) = s[i..].find('<') {
        let at = i + off;
        let Some(tag) = tag_at(s, at) else {
            // a stray '<' or a foreign tag is ordinary text
            i = at + 1;
            continue;
        };
        let end = if tag.closing || tag.self_closing {
            tag.end
        } else {
            element_end(s, tag.name, tag.end).unwrap_or(tag.end)
        };
        if at > text_start {
            out.push(Run { kind: RunKind::Text, start: text_start, end: at });
        }
        out.push(Run { kind: RunKind::Markup, start: at, end });
        text_start = end;
        i = end;
    }
    if text_start < s.len() {
        out.push(Run { kind: RunKind::Text, start: text_start, end: s.len() });
    }
    out
}

/// Rebuilds `s` with every text run passed through `f`; markup is copied as is.
pub fn map_text(s: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(s.len());
    for run in runs(s) {
        match run.kind {
            RunKind::Text => out.push_str(&f(run.slice(s))),
            RunKind::Markup => out.push_str(run.slice(s)),
        }
    }
    out
}
