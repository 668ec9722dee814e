use std::fmt;

use serde::{Deserialize, Serialize};

use crate::instructions::{AddrMode, Modes, Variant};
use crate::report::Diagnostic;

/// Identifies one database record in diagnostics: mnemonic, opcode and mode combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRef {
    pub mnemonic: String,
    pub opcode: u8,
    pub modes: Modes,
}

impl VariantRef {
    pub fn new(mnemonic: &str, v: &Variant) -> Self {
        Self {
            mnemonic: mnemonic.to_string(),
            opcode: v.opcode,
            modes: v.modes.clone(),
        }
    }
}

impl fmt::Display for VariantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ${:02X} [{}]", self.mnemonic, self.opcode, self.modes)
    }
}

/// Cycle cost as shown to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleCost {
    Count(u32),
    Text(String),
    /// Cost that depends on an operand, e.g. block transfers.
    Formula(String),
}

impl fmt::Display for CycleCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleCost::Count(n) => write!(f, "{n}"),
            CycleCost::Text(s) | CycleCost::Formula(s) => f.write_str(s),
        }
    }
}

/// Fields derived from a variant's addressing modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    /// Mnemonic with the bit position filled in (`SMB3`).
    pub mnemonic: String,
    pub syntax: String,
    pub machine_code: String,
    pub mode_label: String,
    pub bytes: u8,
    pub cycles: u32,
    pub cost: CycleCost,
    /// Effective operand expression, e.g. `[ZP16($ZZ) + Y]`.
    pub operand: Option<String>,
    pub abstract_text: String,
    pub name: String,
    pub summary: String,
}

/// Instruction-level text the decoder specializes per variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Templates<'a> {
    pub abstract_text: &'a str,
    pub name: &'a str,
    pub summary: &'a str,
}

#[derive(Debug, Clone)]
pub struct Decoding {
    pub decoded: Decoded,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{at}: declared {declared} bytes but the addressing modes decode to {decoded}")]
    ByteCountMismatch { at: VariantRef, declared: u8, decoded: u8 },
    #[error("{at}: addressing modes decode to more than 255 bytes")]
    ByteCountOverflow { at: VariantRef },
    #[error("{at}: no addressing modes")]
    EmptyModes { at: VariantRef },
    #[error("{at}: fill value {fill} needs a bit position 0-7 and a mnemonic ending in '#'")]
    InvalidFill { at: VariantRef, fill: u8 },
    #[error("{at}: {mode:?} has no operand to decorate")]
    DanglingModifier { at: VariantRef, mode: AddrMode },
}

pub trait Decoder {
    fn decode(
        &self,
        mnemonic: &str,
        variant: &Variant,
        text: Templates<'_>,
    ) -> Result<Decoding, DecodeError>;
}
