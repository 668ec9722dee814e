use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cpus: u16 {
const NMOS6502 = 1 << 0; // original NMOS part
const WDC65C02 = 1 << 1; // CMOS part with the bit instructions
const HUC6280 = 1 << 2;  // Hudson derivative (PC Engine)
}
}

impl Cpus {
    /// Shorthand for a variant every CPU in the family supports.
    pub const FAMILY: Cpus = Cpus::NMOS6502.union(Cpus::WDC65C02).union(Cpus::HUC6280);
    /// Shorthand for the CMOS-era parts.
    pub const CMOS: Cpus = Cpus::WDC65C02.union(Cpus::HUC6280);

    /// Display names in bit order; also used as CSS classes by renderers.
    pub const NAMES: [(Cpus, &'static str); 3] = [
        (Cpus::NMOS6502, "NMOS6502"),
        (Cpus::WDC65C02, "WDC65C02"),
        (Cpus::HUC6280, "HuC6280"),
    ];

    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(cpu, _)| self.contains(*cpu))
            .map(|(_, name)| name)
    }
}

/// Status register bit letters, most significant bit first.
pub const FLAG_LETTERS: [char; 8] = ['N', 'V', 'T', 'B', 'D', 'I', 'Z', 'C'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagSlot {
    Unaffected,
    Literal(bool),
    Expression(String),
}

impl FlagSlot {
    fn cell(&self, letter: char) -> char {
        match self {
            FlagSlot::Unaffected => '-',
            FlagSlot::Literal(true) => '1',
            FlagSlot::Literal(false) => '0',
            FlagSlot::Expression(_) => letter,
        }
    }
}

/// Effect of one instruction on the status register, one slot per bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags(pub [FlagSlot; 8]);

impl Default for Flags {
    fn default() -> Self {
        Self(std::array::from_fn(|_| FlagSlot::Unaffected))
    }
}

impl Flags {
    pub fn new(slots: [FlagSlot; 8]) -> Self {
        Self(slots)
    }

    /// Compact cell, e.g. `N-0----Z`.
    pub fn cell(&self) -> String {
        self.0
            .iter()
            .zip(FLAG_LETTERS)
            .map(|(slot, letter)| slot.cell(letter))
            .collect()
    }

    pub fn expressions(&self) -> impl Iterator<Item = (char, &str)> {
        self.0.iter().zip(FLAG_LETTERS).filter_map(|(slot, letter)| match slot {
            FlagSlot::Expression(e) => Some((letter, e.as_str())),
            _ => None,
        })
    }

    pub fn expressions_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.0.iter_mut().filter_map(|slot| match slot {
            FlagSlot::Expression(e) => Some(e),
            _ => None,
        })
    }
}

/// Builds a [`Flags`] value from eight slots: `-` unaffected, `0`/`1` literal,
/// or a string literal holding the expression the bit receives.
#[macro_export]
macro_rules! flags {
    ($($slot:tt),* $(,)?) => {
        $crate::cpu::Flags::new([$($crate::flag_slot!($slot)),*])
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! flag_slot {
    (-) => {
        $crate::cpu::FlagSlot::Unaffected
    };
    (0) => {
        $crate::cpu::FlagSlot::Literal(false)
    };
    (1) => {
        $crate::cpu::FlagSlot::Literal(true)
    };
    ($expr:literal) => {
        $crate::cpu::FlagSlot::Expression(String::from($expr))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_cell_uses_letters_for_expressions() {
        let f = crate::flags!["MEM:7", -, 0, -, -, 1, "MEM == 0", -];
        assert_eq!(f.cell(), "N-0--1Z-");
        let exprs: Vec<_> = f.expressions().collect();
        assert_eq!(exprs, vec![('N', "MEM:7"), ('Z', "MEM == 0")]);
    }

    #[test]
    fn cpu_names_follow_bit_order() {
        let names: Vec<_> = Cpus::CMOS.names().collect();
        assert_eq!(names, vec!["WDC65C02", "HuC6280"]);
        assert_eq!(Cpus::FAMILY.names().count(), 3);
    }
}
