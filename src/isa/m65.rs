use tracing::debug;

use crate::decoder::{
    CycleCost, DecodeError, Decoded, Decoder, Decoding, Templates, VariantRef,
};
use crate::instructions::{AddrMode, DeclaredCycles, Variant};
use crate::report::Diagnostic;

/// Syntax of the block-transfer operands (source, destination, length).
const BLOCK_SYNTAX: &str = "$SHSL, $DHDL, $LHLL";
const BLOCK_MACHINE: &str = "SL SH DH DL LL HL";
const BLOCK_COST: &str = "17 + 6 * $LHLL";

/// Addressing-mode decoder for the 6502 family (NMOS, 65C02, HuC6280).
pub struct M65Decoder;

impl M65Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for M65Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    Immediate,
    Accumulator,
    ZeroPage,
    Absolute,
}

/// Effective operand of one operand group.
#[derive(Debug, Clone, Copy)]
struct MemRef {
    base: Base,
    indirect: bool,
    // (register, applied after the indirection)
    index: Option<(char, bool)>,
}

impl MemRef {
    fn new(base: Base) -> Self {
        Self { base, indirect: false, index: None }
    }

    fn expr(&self) -> String {
        match self.base {
            Base::Immediate => "$nn".to_string(),
            Base::Accumulator => "A".to_string(),
            Base::ZeroPage => match (self.indirect, self.index) {
                (false, None) => "ZP8($ZZ)".to_string(),
                (false, Some((r, _))) => format!("ZP8($ZZ + {r})"),
                (true, None) => "[ZP16($ZZ)]".to_string(),
                (true, Some((r, false))) => format!("[ZP16($ZZ + {r})]"),
                (true, Some((r, true))) => format!("[ZP16($ZZ) + {r}]"),
            },
            Base::Absolute => match self.index {
                None => "[$hhll]".to_string(),
                Some((r, _)) => format!("[$hhll + {r}]"),
            },
        }
    }
}

#[derive(Default)]
struct Group {
    labels: Vec<&'static str>,
    operand: Option<String>,
    mem: Option<MemRef>,
}

struct Walk {
    groups: Vec<Group>,
    machine: String,
    bytes: u8,
    cycles: u32,
    block: bool,
}

impl Walk {
    fn new(opcode: u8) -> Self {
        // opcode fetch
        Self {
            groups: vec![Group::default()],
            machine: format!("{opcode:02X}"),
            bytes: 1,
            cycles: 1,
            block: false,
        }
    }

    fn group(&mut self) -> &mut Group {
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    /// Appends a base mode costing `(bytes, cycles)`.
    fn base(
        &mut self,
        at: &VariantRef,
        mode: AddrMode,
        syntax: &str,
        machine: &str,
        (bytes, cycles): (u8, u32),
        mem: Option<Base>,
    ) -> Result<(), DecodeError> {
        self.bytes = self
            .bytes
            .checked_add(bytes)
            .ok_or_else(|| DecodeError::ByteCountOverflow { at: at.clone() })?;
        self.cycles = self.cycles.saturating_add(cycles);
        if !machine.is_empty() {
            self.machine.push(' ');
            self.machine.push_str(machine);
        }
        let g = self.group();
        g.labels.push(mode.label());
        if !syntax.is_empty() {
            g.operand = Some(syntax.to_string());
        }
        if let Some(b) = mem {
            g.mem = Some(MemRef::new(b));
        }
        Ok(())
    }

    fn step(&mut self, mode: AddrMode, at: &VariantRef) -> Result<(), DecodeError> {
        match mode {
            AddrMode::ZeroPage => self.base(at, mode, "$ZZ", "ZZ", (1, 3), Some(Base::ZeroPage))?,
            AddrMode::Implied => self.base(at, mode, "", "", (0, 0), None)?,
            AddrMode::Absolute => self.base(at, mode, "$hhll", "ll hh", (2, 4), Some(Base::Absolute))?,
            AddrMode::Immediate => self.base(at, mode, "#$nn", "nn", (1, 1), Some(Base::Immediate))?,
            AddrMode::Accumulator => self.base(at, mode, "A", "", (0, 1), Some(Base::Accumulator))?,
            AddrMode::Relative => self.base(at, mode, "$rr", "rr", (1, 1), None)?,
            AddrMode::Block => {
                self.block = true;
                // label and operands are replaced; machine code keeps accumulating
                self.groups = vec![Group::default()];
                self.base(at, mode, BLOCK_SYNTAX, BLOCK_MACHINE, (6, 0), None)?;
            }
            AddrMode::Indirect => {
                self.cycles = self.cycles.saturating_add(3);
                let g = self.group();
                g.labels.push(mode.label());
                let Some(op) = g.operand.take() else {
                    return Err(DecodeError::DanglingModifier { at: at.clone(), mode });
                };
                g.operand = Some(format!("({op})"));
                if let Some(m) = g.mem.as_mut() {
                    m.indirect = true;
                }
            }
            AddrMode::XIndexed | AddrMode::YIndexed => {
                let reg = if mode == AddrMode::XIndexed { 'X' } else { 'Y' };
                let g = self.group();
                g.labels.push(mode.label());
                let Some(op) = g.operand.as_mut() else {
                    return Err(DecodeError::DanglingModifier { at: at.clone(), mode });
                };
                op.push(',');
                op.push(reg);
                if let Some(m) = g.mem.as_mut() {
                    m.index = Some((reg, m.indirect));
                }
            }
            AddrMode::Secondary => self.groups.push(Group::default()),
        }
        Ok(())
    }

    fn label(&self) -> String {
        self.groups
            .iter()
            .filter(|g| !g.labels.is_empty())
            .map(|g| g.labels.join(", "))
            .collect::<Vec<_>>()
            .join(" and ")
    }

    fn syntax(&self, mnemonic: &str) -> String {
        let ops: Vec<&str> = self.groups.iter().filter_map(|g| g.operand.as_deref()).collect();
        if ops.is_empty() {
            mnemonic.to_string()
        } else {
            format!("{mnemonic} {}", ops.join(", "))
        }
    }

    fn operand(&self) -> Option<String> {
        // the last group that addresses data wins (`TST #$nn, $ZZ` tests memory)
        self.groups.iter().rev().find_map(|g| g.mem).map(|m| m.expr())
    }
}

fn fill_mnemonic(mnemonic: &str, fill: u8, at: &VariantRef) -> Result<String, DecodeError> {
    match mnemonic.strip_suffix('#') {
        Some(stem) if fill <= 7 => Ok(format!("{stem}{fill}")),
        _ => Err(DecodeError::InvalidFill { at: at.clone(), fill }),
    }
}

impl Decoder for M65Decoder {
    fn decode(
        &self,
        mnemonic: &str,
        variant: &Variant,
        text: Templates<'_>,
    ) -> Result<Decoding, DecodeError> {
        let at = VariantRef::new(mnemonic, variant);
        if variant.modes.is_empty() {
            return Err(DecodeError::EmptyModes { at });
        }

        let mut abstract_text = text.abstract_text.replace("IMM", "$nn").replace("REL", "$rr");
        let mut name = text.name.to_string();
        let mut summary = text.summary.to_string();
        let mut op_mnemonic = mnemonic.to_string();
        if let Some(fill) = variant.fill {
            op_mnemonic = fill_mnemonic(mnemonic, fill, &at)?;
            let digit = fill.to_string();
            abstract_text = abstract_text.replace("#n", &digit);
            name = name.replace("#n", &digit);
            summary = summary.replace("#n", &digit);
        }

        let mut walk = Walk::new(variant.opcode);
        for mode in variant.modes.iter() {
            walk.step(mode, &at)?;
        }

        if walk.bytes != variant.bytes {
            return Err(DecodeError::ByteCountMismatch {
                at,
                declared: variant.bytes,
                decoded: walk.bytes,
            });
        }

        let mode_label = walk.label();
        let mut diagnostics = Vec::new();
        let cost = if walk.block {
            CycleCost::Formula(BLOCK_COST.to_string())
        } else {
            match &variant.cycles {
                DeclaredCycles::Unspecified => CycleCost::Count(walk.cycles),
                DeclaredCycles::Text(s) => CycleCost::Text(s.clone()),
                DeclaredCycles::Count(n) => {
                    if *n != walk.cycles {
                        diagnostics.push(Diagnostic::CycleMismatch {
                            at: at.clone(),
                            mode: mode_label.clone(),
                            declared: *n,
                            decoded: walk.cycles,
                        });
                    }
                    CycleCost::Count(*n)
                }
            }
        };

        let decoded = Decoded {
            syntax: walk.syntax(&op_mnemonic),
            machine_code: walk.machine.clone(),
            operand: walk.operand(),
            mode_label,
            bytes: walk.bytes,
            cycles: walk.cycles,
            cost,
            mnemonic: op_mnemonic,
            abstract_text,
            name,
            summary,
        };
        debug!(variant = %at, syntax = %decoded.syntax, machine = %decoded.machine_code, "decoded");
        Ok(Decoding { decoded, diagnostics })
    }
}
