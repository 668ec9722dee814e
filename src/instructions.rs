use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::cpu::{Cpus, Flags};
use crate::decoder::Decoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddrMode {
    ZeroPage,
    Implied,
    Absolute,
    Immediate,
    Accumulator,
    Relative,
    Block,
    Indirect,
    XIndexed,
    YIndexed,
    /// Starts the next operand group (e.g. `BBR0 $ZZ, $rr`).
    Secondary,
}

impl AddrMode {
    pub fn label(self) -> &'static str {
        match self {
            AddrMode::ZeroPage => "Zero Page",
            AddrMode::Implied => "Implied",
            AddrMode::Absolute => "Absolute",
            AddrMode::Immediate => "Immediate",
            AddrMode::Accumulator => "Accumulator",
            AddrMode::Relative => "Relative",
            AddrMode::Block => "Block",
            AddrMode::Indirect => "Indirect",
            AddrMode::XIndexed => "X-Indexed",
            AddrMode::YIndexed => "Y-Indexed",
            AddrMode::Secondary => "Secondary",
        }
    }

    pub fn then(self, next: AddrMode) -> Modes {
        Modes(vec![self, next])
    }
}

/// Ordered addressing-mode tags of one variant, in authoring order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modes(Vec<AddrMode>);

impl Modes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn then(mut self, next: AddrMode) -> Modes {
        self.0.push(next);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = AddrMode> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<AddrMode> for Modes {
    fn from(m: AddrMode) -> Self {
        Modes(vec![m])
    }
}

impl FromIterator<AddrMode> for Modes {
    fn from_iter<I: IntoIterator<Item = AddrMode>>(iter: I) -> Self {
        Modes(iter.into_iter().collect())
    }
}

impl BitOr for AddrMode {
    type Output = Modes;
    fn bitor(self, rhs: AddrMode) -> Modes {
        self.then(rhs)
    }
}

impl BitOr<AddrMode> for Modes {
    type Output = Modes;
    fn bitor(self, rhs: AddrMode) -> Modes {
        self.then(rhs)
    }
}

impl fmt::Display for Modes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{m:?}")?;
        }
        Ok(())
    }
}

/// Cycle count as written in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclaredCycles {
    Unspecified,
    Count(u32),
    /// Free-form timing note, e.g. "2 (4 if branch taken)".
    Text(String),
}

impl From<u32> for DeclaredCycles {
    fn from(n: u32) -> Self {
        DeclaredCycles::Count(n)
    }
}

impl From<&str> for DeclaredCycles {
    fn from(s: &str) -> Self {
        DeclaredCycles::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub cpus: Cpus,
    pub opcode: u8,
    pub bytes: u8,
    pub cycles: DeclaredCycles,
    pub modes: Modes,
    /// Bit position for the `SMB#`/`BBR#` style families.
    pub fill: Option<u8>,
    /// Overrides the instruction-level abstract for this variant only.
    pub abstract_text: Option<String>,
    /// Filled in by the enrichment pass.
    pub decoded: Option<Decoded>,
}

impl Variant {
    pub fn new(
        cpus: Cpus,
        opcode: u8,
        bytes: u8,
        cycles: impl Into<DeclaredCycles>,
        modes: impl Into<Modes>,
    ) -> Self {
        Self {
            cpus,
            opcode,
            bytes,
            cycles: cycles.into(),
            modes: modes.into(),
            fill: None,
            abstract_text: None,
            decoded: None,
        }
    }

    /// Variant whose cycle cost is left for the decoder to compute.
    pub fn untimed(cpus: Cpus, opcode: u8, bytes: u8, modes: impl Into<Modes>) -> Self {
        Self::new(cpus, opcode, bytes, DeclaredCycles::Unspecified, modes)
    }

    pub fn fill(mut self, bit: u8) -> Self {
        self.fill = Some(bit);
        self
    }

    pub fn abstract_text(mut self, text: &str) -> Self {
        self.abstract_text = Some(text.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Instruction {
    pub mnemonic: String,
    /// Underscores mark the letters that spell the mnemonic, e.g. `_Loa_d _Accumulator`.
    pub origin: String,
    /// Derived from `origin` during enrichment.
    pub name: String,
    pub abstract_text: String,
    pub description: String,
    pub summary: String,
    pub note: String,
    pub variants: Vec<Variant>,
    pub flags: Flags,
}

impl Instruction {
    pub fn new(mnemonic: &str, origin: &str) -> Self {
        Self {
            mnemonic: mnemonic.to_string(),
            origin: origin.to_string(),
            ..Default::default()
        }
    }

    pub fn abstract_text(mut self, text: &str) -> Self {
        self.abstract_text = text.to_string();
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn summary(mut self, text: &str) -> Self {
        self.summary = text.to_string();
        self
    }

    pub fn note(mut self, text: &str) -> Self {
        self.note = text.to_string();
        self
    }

    pub fn variant(mut self, v: Variant) -> Self {
        self.variants.push(v);
        self
    }

    pub fn variants(mut self, vs: impl IntoIterator<Item = Variant>) -> Self {
        self.variants.extend(vs);
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionGroup {
    pub title: String,
    pub instructions: Vec<Instruction>,
}

impl InstructionGroup {
    pub fn new(title: &str, instructions: Vec<Instruction>) -> Self {
        Self {
            title: title.to_string(),
            instructions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AddrMode::*;

    #[test]
    fn compose_keeps_order_without_ceiling() {
        let m = ZeroPage | Indirect | YIndexed;
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![ZeroPage, Indirect, YIndexed]);

        let long: Modes = std::iter::repeat(Implied).take(9).collect();
        assert_eq!(long.len(), 9);
        assert_eq!((ZeroPage | Secondary | Relative).to_string(), "ZeroPage | Secondary | Relative");
    }

    #[test]
    fn declared_cycles_from_literals() {
        assert_eq!(DeclaredCycles::from(4), DeclaredCycles::Count(4));
        assert_eq!(
            DeclaredCycles::from("2 (4 if branch taken)"),
            DeclaredCycles::Text("2 (4 if branch taken)".into())
        );
    }
}
