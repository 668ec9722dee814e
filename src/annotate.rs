use tracing::warn;

use crate::markup::{map_text, runs, Run};
use crate::vocab::{AnnotatorConfig, Pattern, Substitution, Word, WordKind};

/// Which passes a field receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Abstracts, flag expressions and memory operands: every pass.
    Expression,
    /// Description, summary and note: HTML escaping, then acronyms and words
    /// only, without the single-letter words so English articles stay untouched.
    Prose,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern `{pattern}` has an empty delimiter")]
    EmptyLiteral { pattern: &'static str },
    #[error("pattern `{pattern}` references capture ${capture} but has {available}")]
    MissingCapture {
        pattern: &'static str,
        capture: usize,
        available: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub text: String,
    /// Set when the pattern pass was skipped for this field.
    pub skipped: Option<PatternError>,
}

pub struct Annotator {
    config: AnnotatorConfig,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotatorConfig::default())
    }
}

impl Annotator {
    pub fn new(config: AnnotatorConfig) -> Self {
        Self { config }
    }

    pub fn annotate(&self, text: &str, profile: Profile) -> Annotation {
        let mut skipped = None;
        let mut out = text.to_string();
        match profile {
            Profile::Expression => {
                out = substitute_until_stable(&out, self.config.symbols);
                match rewrite_patterns(&out, self.config.patterns) {
                    Ok(s) => out = s,
                    Err(e) => skipped = Some(e),
                }
            }
            Profile::Prose => out = map_text(&out, escape_prose),
        }
        for acr in self.config.acronyms {
            out = map_text(&out, |t| t.replace(acr.from, acr.to));
        }
        out = tag_words(&out, self.config.words, profile);
        Annotation { text: out, skipped }
    }

    /// Annotates `text`, logging a skipped pattern pass instead of returning it.
    pub fn annotate_text(&self, text: &str, profile: Profile) -> String {
        let a = self.annotate(text, profile);
        if let Some(e) = &a.skipped {
            warn!(text, "pattern pass skipped: {e}");
        }
        a.text
    }
}

/// Escapes `<`, `>` and any `&` that does not already start an entity.
fn escape_prose(t: &str) -> String {
    let mut out = String::with_capacity(t.len());
    for (i, c) in t.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if !starts_entity(&t[i + 1..]) => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// `rest` follows an `&`: `name;` or `#digits;`.
fn starts_entity(rest: &str) -> bool {
    let (body, numeric) = match rest.strip_prefix('#') {
        Some(body) => (body, true),
        None => (rest, false),
    };
    let Some(n) = body.find(';') else {
        return false;
    };
    n > 0
        && body[..n]
            .chars()
            .all(|c| if numeric { c.is_ascii_digit() } else { c.is_ascii_alphanumeric() })
}

fn substitute_until_stable(text: &str, table: &[Substitution]) -> String {
    let mut cur = text.to_string();
    loop {
        let mut changed = false;
        for s in table {
            let next = map_text(&cur, |t| t.replace(s.from, s.to));
            if next != cur {
                cur = next;
                changed = true;
            }
        }
        if !changed {
            return cur;
        }
    }
}

fn validate(p: &Pattern) -> Result<(), PatternError> {
    if p.literals.is_empty() || p.literals.iter().any(|l| l.is_empty()) {
        return Err(PatternError::EmptyLiteral { pattern: p.name });
    }
    let available = p.captures();
    let b = p.template.as_bytes();
    for (i, &c) in b.iter().enumerate() {
        if c == b'$' {
            if let Some(d) = b.get(i + 1).filter(|d| d.is_ascii_digit()) {
                let capture = usize::from(d - b'0');
                if capture == 0 || capture > available {
                    return Err(PatternError::MissingCapture { pattern: p.name, capture, available });
                }
            }
        }
    }
    Ok(())
}

fn rewrite_patterns(text: &str, patterns: &[Pattern]) -> Result<String, PatternError> {
    for p in patterns {
        validate(p)?;
    }
    let mut cur = text.to_string();
    for p in patterns {
        let mut from = 0;
        while let Some(m) = find_pattern(&cur, p, from) {
            let replacement = expand(p.template, &m.captures);
            cur.replace_range(m.start..m.end, &replacement);
            from = m.start + replacement.len();
        }
    }
    Ok(cur)
}

struct Match {
    start: usize,
    end: usize,
    captures: Vec<String>,
}

fn in_text(runs: &[Run], start: usize, end: usize) -> bool {
    runs.iter().any(|r| r.is_text() && r.start <= start && end <= r.end)
}

fn find_pattern(s: &str, p: &Pattern, from: usize) -> Option<Match> {
    let runs = runs(s);
    let open = p.literals[0];
    let mut search = from;
    while let Some(off) = s.get(search..)?.find(open) {
        let start = search + off;
        search = start + 1;
        if !in_text(&runs, start, start + open.len()) {
            continue;
        }
        if let Some(m) = match_rest(s, &runs, p, start) {
            if !(m.captures.len() == 1 && p.except.contains(&m.captures[0].as_str())) {
                return Some(m);
            }
        }
    }
    None
}

/// Matches the captures and remaining delimiters after an opening delimiter at `start`.
fn match_rest(s: &str, runs: &[Run], p: &Pattern, start: usize) -> Option<Match> {
    let mut pos = start + p.literals[0].len();
    let mut captures = Vec::new();
    for lit in &p.literals[1..] {
        let first = lit.chars().next()?;
        // the capture ends at the first delimiter character outside markup
        let end = s[pos..]
            .char_indices()
            .map(|(i, _)| pos + i)
            .find(|&i| s[i..].starts_with(first) && in_text(runs, i, i + first.len_utf8()))?;
        if end == pos || !s[end..].starts_with(lit) || !in_text(runs, end, end + lit.len()) {
            return None;
        }
        captures.push(s[pos..end].to_string());
        pos = end + lit.len();
    }
    Some(Match { start, end: pos, captures })
}

fn expand(template: &str, captures: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' {
            if let Some(n) = chars.peek().and_then(|d| d.to_digit(10)) {
                chars.next();
                if let Some(cap) = (n as usize).checked_sub(1).and_then(|i| captures.get(i)) {
                    out.push_str(cap);
                }
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Whether `c` may border a tagged word; `None` is a run edge.
/// Every word starts and ends with a non-boundary character, brackets included.
fn is_boundary(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => !(c.is_alphanumeric() || matches!(c, '<' | '>' | '[' | ']' | '\\')),
    }
}

/// Length of `w` matched at the start of `rest`, with the bit position for indexed words.
/// `rest` ends with the text run, so markup on either side counts as a boundary.
fn match_word(w: &Word, rest: &str) -> Option<(usize, Option<char>)> {
    let tail = rest.strip_prefix(w.symbol)?;
    let (len, bit) = match w.kind {
        WordKind::Plain => (w.symbol.len(), None),
        WordKind::BitIndexed => {
            let mut it = tail.strip_prefix(':')?.chars();
            let d = it.next().filter(char::is_ascii_digit)?;
            (w.symbol.len() + 2, Some(d))
        }
    };
    is_boundary(rest[len..].chars().next()).then_some((len, bit))
}

fn word_markup(w: &Word, bit: Option<char>) -> String {
    match bit {
        Some(n) => format!(
            r#"<abbr title="{}, bit {n}">{}<sub>{n}</sub></abbr>"#,
            w.title, w.display
        ),
        None => format!(r#"<abbr title="{}">{}</abbr>"#, w.title, w.display),
    }
}

fn tag_words(s: &str, words: &[Word], profile: Profile) -> String {
    let mut out = String::with_capacity(s.len());
    for run in runs(s) {
        if !run.is_text() {
            out.push_str(run.slice(s));
            continue;
        }
        let mut i = run.start;
        while i < run.end {
            let rest = &s[i..run.end];
            let prev = s[run.start..i].chars().next_back();
            let hit = if is_boundary(prev) {
                words
                    .iter()
                    .filter(|w| !(profile == Profile::Prose && w.is_single_letter()))
                    .find_map(|w| match_word(w, rest).map(|(len, bit)| (w, len, bit)))
            } else {
                None
            };
            match hit {
                Some((w, len, bit)) => {
                    out.push_str(&word_markup(w, bit));
                    i += len;
                }
                None => {
                    let c = rest.chars().next().map_or(1, char::len_utf8);
                    out.push_str(&s[i..i + c]);
                    i += c;
                }
            }
        }
    }
    out
}

/// Display name from an origin annotation: `_Loa_d` becomes `<em>L</em>oa<em>d</em>`.
pub fn display_name(origin: &str) -> String {
    let mut out = String::with_capacity(origin.len() * 2);
    let mut rest = origin;
    while let Some(pos) = rest.find('_') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(tail) = after.strip_prefix("#n") {
            out.push_str("<em>#n</em>");
            rest = tail;
        } else if let Some(c) = after.chars().next().filter(|c| c.is_alphanumeric()) {
            out.push_str("<em>");
            out.push(c);
            out.push_str("</em>");
            rest = &after[c.len_utf8()..];
        } else {
            out.push('_');
            rest = after;
        }
    }
    out.push_str(rest);
    out.replace("</em><em>", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{ACRONYMS, PATTERNS, SYMBOLS, WORDS};
    use pretty_assertions::assert_eq;

    fn expr(s: &str) -> String {
        Annotator::default().annotate_text(s, Profile::Expression)
    }

    #[test]
    fn escapes_and_tags_operators() {
        assert_eq!(
            expr("A = A | MEM"),
            r#"<abbr title="Accumulator register">A</abbr> <var title="assignment"></var> <abbr title="Accumulator register">A</abbr> <var title="bitwise or"></var> MEM"#
        );
        assert_eq!(expr("x >= y"), r#"x <var title="greater than or equal"></var> y"#);
        assert_eq!(expr("1 << 2"), r#"1 <var title="shift bits left"></var> 2"#);
        assert_eq!(expr("a && b || c"), r#"a <var title="logical and"></var> b <var title="logical or"></var> c"#);
    }

    #[test]
    fn zero_page_helpers_are_rewritten() {
        assert_eq!(
            expr("ZP8($ZZ)"),
            r#"<var title="Byte from Zero Page memory (constrained range 0x2000 - 0x20FF)">ZP($ZZ)</var>"#
        );
        assert_eq!(
            expr("[ZP16($ZZ)]"),
            r#"<var title="Byte at 16-bit address in Zero Page memory">[ZP($ZZ)]</var>"#
        );
        assert_eq!(
            expr("[ZP16($ZZ) + Y]"),
            r#"<var title="Byte at 16-bit address (indexed) in Zero Page memory">[ZP($ZZ) <var title="add"></var> Y]</var>"#
        );
        assert_eq!(
            expr("ZP8($ZZ + X)"),
            r#"<var title="Byte from Zero Page memory (constrained range 0x2000 - 0x20FF)">ZP($ZZ <var title="add"></var> X)</var>"#
        );
    }

    #[test]
    fn dereference_leaves_stack_top() {
        assert_eq!(
            expr("PC = [$FFFE]"),
            r#"<abbr title="Program Counter">PC</abbr> <var title="assignment"></var> <var title="dereferenced">$FFFE</var>"#
        );
        assert_eq!(expr("[SP]"), r#"<abbr title="Top Stack byte">*S</abbr>"#);
        assert_eq!(expr("[SP]:7"), r#"<abbr title="Top Stack byte, bit 7">*S<sub>7</sub></abbr>"#);
    }

    #[test]
    fn words_need_boundaries() {
        assert_eq!(expr("MEM:6"), r#"<abbr title="Memory, bit 6">MEM<sub>6</sub></abbr>"#);
        assert_eq!(
            expr("A X"),
            r#"<abbr title="Accumulator register">A</abbr> <abbr title="X register">X</abbr>"#
        );
        assert_eq!(expr("AX"), "AX");
        assert_eq!(expr("$nn"), "$nn");
        assert_eq!(expr("SPX"), "SPX");
    }

    #[test]
    fn acronyms_match_anywhere() {
        assert_eq!(
            expr("PCH"),
            r#"<abbr title="Program Counter High Byte">PC<sub>H</sub></abbr>"#
        );
        assert_eq!(
            Annotator::default().annotate_text("raises IRQ2", Profile::Prose),
            r#"raises <abbr title="Interrupt Request 2">IRQ 2</abbr>"#
        );
    }

    #[test]
    fn prose_skips_single_letters_and_operators() {
        let out = Annotator::default().annotate_text("A copy of the CPU flags in P, with the SP - 1", Profile::Prose);
        assert_eq!(
            out,
            r#"A copy of the <abbr title="Central Processing Unit">CPU</abbr> flags in P, with the <abbr title="Stack Pointer">S</abbr> - 1"#
        );
    }

    #[test]
    fn tagged_words_are_not_wrapped_again() {
        let tagged = r#"<abbr title="Accumulator register">A</abbr>"#;
        assert_eq!(expr(tagged), tagged);
    }

    #[test]
    fn annotation_is_idempotent_over_the_vocabulary() {
        let mut inputs: Vec<String> = Vec::new();
        inputs.extend(SYMBOLS.iter().map(|s| format!("A {} X", s.from)));
        inputs.extend(ACRONYMS.iter().map(|s| format!("{} = MEM:3", s.from)));
        inputs.extend(WORDS.iter().map(|w| match w.kind {
            WordKind::Plain => format!("{} = {}", w.symbol, w.symbol),
            WordKind::BitIndexed => format!("{}:5 = 1", w.symbol),
        }));
        inputs.extend(
            [
                "ZP8($ZZ)",
                "ZP8($ZZ + X)",
                "[ZP16($ZZ)]",
                "[ZP16($ZZ + X)]",
                "[ZP16($ZZ) + Y]",
                "[$hhll + Y]",
                "PC = [$FFFE]",
                "[SP] = P",
                "MEM == 0",
                "A = A & ~MEM",
            ]
            .map(String::from),
        );
        let a = Annotator::default();
        for profile in [Profile::Expression, Profile::Prose] {
            for s in &inputs {
                let once = a.annotate_text(s, profile);
                let twice = a.annotate_text(&once, profile);
                assert_eq!(twice, once, "input {s:?}");
            }
        }
    }

    #[test]
    fn adjacent_tokens_are_stable() {
        let mut tokens: Vec<String> = Vec::new();
        tokens.extend(SYMBOLS.iter().map(|s| s.from.to_string()));
        tokens.extend(ACRONYMS.iter().map(|s| s.from.to_string()));
        tokens.extend(WORDS.iter().map(|w| match w.kind {
            WordKind::Plain => w.symbol.to_string(),
            WordKind::BitIndexed => format!("{}:5", w.symbol),
        }));
        tokens.extend(["ZP8(", "[ZP16(", "(", ")", "[", "]", "$ZZ"].map(String::from));

        let a = Annotator::default();
        for first in &tokens {
            for second in &tokens {
                let s = format!("{first}{second}");
                for profile in [Profile::Expression, Profile::Prose] {
                    let once = a.annotate_text(&s, profile);
                    let twice = a.annotate_text(&once, profile);
                    assert_eq!(twice, once, "input {s:?} ({profile:?})");
                }
            }
        }
    }

    #[test]
    fn words_are_bounded_by_word_characters() {
        for w in WORDS {
            let (first, last) = (w.symbol.chars().next(), w.symbol.chars().next_back());
            assert!(!is_boundary(first) && !is_boundary(last), "{:?}", w.symbol);
        }
    }

    #[test]
    fn stack_top_next_to_operators() {
        assert_eq!(
            expr("A=[SP]"),
            r#"<abbr title="Accumulator register">A</abbr><var title="assignment"></var><abbr title="Top Stack byte">*S</abbr>"#
        );
        assert_eq!(
            expr("P=[SP]:7"),
            r#"<abbr title="Processor Status Register">P</abbr><var title="assignment"></var><abbr title="Top Stack byte, bit 7">*S<sub>7</sub></abbr>"#
        );
        // the inner SP of an unmatched stack reference stays plain
        assert_eq!(expr("x[SP]"), "x[SP]");
        assert_eq!(expr("MEM+1"), r#"MEM<var title="add"></var>1"#);
        assert_eq!(
            expr("A+X"),
            r#"<abbr title="Accumulator register">A</abbr><var title="add"></var><abbr title="X register">X</abbr>"#
        );
    }

    #[test]
    fn raw_angle_brackets_are_escaped() {
        assert_eq!(
            expr("A<B>C"),
            r#"<abbr title="Accumulator register">A</abbr><var title="less than"></var><abbr title="Break Flag">B</abbr><var title="greater than"></var><abbr title="Carry Flag">C</abbr>"#
        );
        let out = expr("If A<MEM: C = 1 Else: C = X>MEM");
        assert!(!out.contains("<MEM"), "{out}");
        assert!(out.contains(r#"<var title="less than"></var>MEM"#), "{out}");
        assert!(out.contains(r#"<var title="greater than"></var>MEM"#), "{out}");
        assert_eq!(expr(&out), out);
    }

    #[test]
    fn prose_is_escaped_before_tagging() {
        let a = Annotator::default();
        let once = a.annotate_text("<CPUALU", Profile::Prose);
        assert_eq!(
            once,
            r#"&lt;<abbr title="Central Processing Unit">CPU</abbr><abbr title="Arithmetic Logic Unit">ALU</abbr>"#
        );
        assert_eq!(a.annotate_text(&once, Profile::Prose), once);
        assert_eq!(a.annotate_text("A & B > C", Profile::Prose), "A &amp; B &gt; C");
        assert_eq!(a.annotate_text("A &amp; B &#38; C", Profile::Prose), "A &amp; B &#38; C");
    }

    static BROKEN: &[Pattern] = &[Pattern {
        name: "broken",
        literals: &["{", "}"],
        template: "<var>$2</var>",
        except: &[],
    }];

    static EMPTY: &[Pattern] = &[Pattern {
        name: "empty",
        literals: &["(", ""],
        template: "$1",
        except: &[],
    }];

    #[test]
    fn malformed_pattern_skips_only_that_pass() {
        let config = AnnotatorConfig { patterns: BROKEN, ..AnnotatorConfig::default() };
        let a = Annotator::new(config).annotate("A = [$hhll]", Profile::Expression);
        assert_eq!(
            a.skipped,
            Some(PatternError::MissingCapture { pattern: "broken", capture: 2, available: 1 })
        );
        // literal and word passes still ran
        assert_eq!(
            a.text,
            r#"<abbr title="Accumulator register">A</abbr> <var title="assignment"></var> [$hhll]"#
        );

        let config = AnnotatorConfig { patterns: EMPTY, ..AnnotatorConfig::default() };
        let a = Annotator::new(config).annotate("A", Profile::Expression);
        assert_eq!(a.skipped, Some(PatternError::EmptyLiteral { pattern: "empty" }));
    }

    #[test]
    fn shipped_patterns_are_valid() {
        for p in PATTERNS {
            assert_eq!(validate(p), Ok(()));
        }
    }

    #[test]
    fn display_name_emphasises_mnemonic_letters() {
        assert_eq!(
            display_name("_Loa_d _Accumulator"),
            "<em>L</em>oa<em>d</em> <em>A</em>ccumulator"
        );
        assert_eq!(
            display_name("_Set _Memory _Bit _#n"),
            "<em>S</em>et <em>M</em>emory <em>B</em>it <em>#n</em>"
        );
        assert_eq!(display_name("_T_I_I"), "<em>TII</em>");
        assert_eq!(display_name("no_ marks"), "no_ marks");
    }
}
