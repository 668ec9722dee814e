use std::fmt;

use serde::Serialize;

use crate::decoder::VariantRef;

/// Non-fatal finding from the enrichment pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// Declared cycle count disagrees with the addressing-mode arithmetic.
    CycleMismatch {
        at: VariantRef,
        mode: String,
        declared: u32,
        decoded: u32,
    },
    /// An annotation pass failed for one field; the field keeps the earlier passes' output.
    SkippedPass {
        mnemonic: String,
        at: Option<VariantRef>,
        field: &'static str,
        pass: &'static str,
        error: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CycleMismatch { at, mode, declared, decoded } => write!(
                f,
                "cycle mismatch {at} ({mode}): expected {declared} got {decoded}"
            ),
            Diagnostic::SkippedPass { mnemonic, at: Some(at), field, pass, error } => {
                write!(f, "{mnemonic}: skipped {pass} on {field} of {at}: {error}")
            }
            Diagnostic::SkippedPass { mnemonic, at: None, field, pass, error } => {
                write!(f, "{mnemonic}: skipped {pass} on {field}: {error}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichReport {
    pub groups: usize,
    pub instructions: usize,
    pub variants: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl EnrichReport {
    pub fn warnings(&self) -> usize {
        self.diagnostics.len()
    }
}
