//! Substitution tables for the annotator.
//!
//! Every table is ordered: an entry whose source is a prefix of another
//! entry's source must come after it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub from: &'static str,
    pub to: &'static str,
}

const fn sub(from: &'static str, to: &'static str) -> Substitution {
    Substitution { from, to }
}

/// A capture pattern: literal delimiters with captures between consecutive
/// literals. `$1`, `$2`, .. in the template reinsert the captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub literals: &'static [&'static str],
    pub template: &'static str,
    /// Whole-capture values that leave the match untouched.
    pub except: &'static [&'static str],
}

impl Pattern {
    pub fn captures(&self) -> usize {
        self.literals.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Plain,
    /// Followed by `:` and one bit position, e.g. `MEM:7`.
    BitIndexed,
}

/// Register, flag or memory word tagged only at word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub symbol: &'static str,
    pub kind: WordKind,
    pub title: &'static str,
    pub display: &'static str,
}

impl Word {
    const fn plain(symbol: &'static str, title: &'static str, display: &'static str) -> Self {
        Self { symbol, kind: WordKind::Plain, title, display }
    }

    const fn bit(symbol: &'static str, title: &'static str, display: &'static str) -> Self {
        Self { symbol, kind: WordKind::BitIndexed, title, display }
    }

    /// Literal text the word starts with (`MEM:` for bit-indexed words).
    pub fn source(&self) -> String {
        match self.kind {
            WordKind::Plain => self.symbol.to_string(),
            WordKind::BitIndexed => format!("{}:", self.symbol),
        }
    }

    pub fn is_single_letter(&self) -> bool {
        self.kind == WordKind::Plain && self.symbol.chars().count() == 1
    }
}

pub static SYMBOLS: &[Substitution] = &[
    // escape first
    sub(">", "&gt;"),
    sub("<", "&lt;"),
    sub("=", "&equal;"),
    sub("/", "&divide;"),
    sub("&lt;&lt;", r#"<var title="shift bits left"></var>"#),
    sub("&gt;&gt;", r#"<var title="shift bits right"></var>"#),
    sub("*", r#"<var title="multiply"></var>"#),
    sub("-", r#"<var title="subtract"></var>"#),
    sub("+", r#"<var title="add"></var>"#),
    sub("&divide;", r#"<var title="divide"></var>"#),
    sub("&equal;&equal;", r#"<var title="equality"></var>"#),
    sub("&gt;&equal;", r#"<var title="greater than or equal"></var>"#),
    sub("&lt;&equal;", r#"<var title="less than or equal"></var>"#),
    sub("&gt;", r#"<var title="greater than"></var>"#),
    sub("&lt;", r#"<var title="less than"></var>"#),
    sub("&equal;", r#"<var title="assignment"></var>"#),
    sub("&&", r#"<var title="logical and"></var>"#),
    sub("||", r#"<var title="logical or"></var>"#),
    sub("&", r#"<var title="bitwise and"></var>"#),
    sub("|", r#"<var title="bitwise or"></var>"#),
    sub("^", r#"<var title="bitwise xor"></var>"#),
    sub("~", r#"<var title="bitwise not"></var>"#),
];

pub static PATTERNS: &[Pattern] = &[
    Pattern {
        name: "zero page byte",
        literals: &["ZP8(", ")"],
        template: r#"<var title="Byte from Zero Page memory (constrained range 0x2000 - 0x20FF)">ZP($1)</var>"#,
        except: &[],
    },
    Pattern {
        name: "zero page pointer",
        literals: &["[ZP16(", ")]"],
        template: r#"<var title="Byte at 16-bit address in Zero Page memory">[ZP($1)]</var>"#,
        except: &[],
    },
    Pattern {
        name: "indexed zero page pointer",
        literals: &["[ZP16(", ")", "]"],
        template: r#"<var title="Byte at 16-bit address (indexed) in Zero Page memory">[ZP($1)$2]</var>"#,
        except: &[],
    },
    Pattern {
        name: "dereference",
        literals: &["[", "]"],
        template: r#"<var title="dereferenced">$1</var>"#,
        except: &["SP"],
    },
];

pub static ACRONYMS: &[Substitution] = &[
    sub("ALU", r#"<abbr title="Arithmetic Logic Unit">ALU</abbr>"#),
    sub("CPU", r#"<abbr title="Central Processing Unit">CPU</abbr>"#),
    sub("LSB", r#"<abbr title="Least Significant Bit">LSB</abbr>"#),
    sub("MSB", r#"<abbr title="Most Significant Bit">MSB</abbr>"#),
    sub("PCH", r#"<abbr title="Program Counter High Byte">PC<sub>H</sub></abbr>"#),
    sub("PCL", r#"<abbr title="Program Counter Low Byte">PC<sub>L</sub></abbr>"#),
    sub("IRQ1", r#"<abbr title="Interrupt Request 1">IRQ 1</abbr>"#),
    sub("IRQ2", r#"<abbr title="Interrupt Request 2">IRQ 2</abbr>"#),
];

pub static WORDS: &[Word] = &[
    Word::bit("[SP]", "Top Stack byte", "*S"),
    Word::bit("MEM", "Memory", "MEM"),
    Word::bit("SP", "Stack pointer", "S"),
    Word::bit("A", "Accumulator register", "A"),
    Word::bit("X", "X register", "X"),
    Word::bit("Y", "Y register", "Y"),
    Word::plain("[SP]", "Top Stack byte", "*S"),
    Word::plain("MMU", "Memory Management Unit", "MMU"),
    Word::plain("PC", "Program Counter", "PC"),
    Word::plain("SP", "Stack Pointer", "S"),
    Word::plain("A", "Accumulator register", "A"),
    Word::plain("X", "X register", "X"),
    Word::plain("Y", "Y register", "Y"),
    Word::plain("P", "Processor Status Register", "P"),
    Word::plain("N", "Negative Flag", "N"),
    Word::plain("V", "Overflow Flag", "V"),
    Word::plain("T", "Memory Transfer Flag", "T"),
    Word::plain("B", "Break Flag", "B"),
    Word::plain("D", "Decimal Mode Flag", "D"),
    Word::plain("I", "Interrupt Disable Flag", "I"),
    Word::plain("Z", "Zero Flag", "Z"),
    Word::plain("C", "Carry Flag", "C"),
];

/// The annotator's tables. Immutable once built.
#[derive(Debug, Clone, Copy)]
pub struct AnnotatorConfig {
    pub symbols: &'static [Substitution],
    pub patterns: &'static [Pattern],
    pub acronyms: &'static [Substitution],
    pub words: &'static [Word],
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            symbols: SYMBOLS,
            patterns: PATTERNS,
            acronyms: ACRONYMS,
            words: WORDS,
        }
    }
}
