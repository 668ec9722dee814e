pub mod annotate;
pub mod cpu;
pub mod decoder;
pub mod enrich;
pub mod instructions;
pub mod markup;
pub mod report;
pub mod vocab;

pub mod isa {
    pub mod db; // authored HuC6280/65C02/6502 subset
    pub mod m65; // 6502-family addressing modes
}

pub use annotate::{Annotator, Profile};
pub use cpu::{Cpus, FlagSlot, Flags};
pub use decoder::{CycleCost, DecodeError, Decoded, Decoder};
pub use enrich::Enricher;
pub use instructions::{AddrMode, Instruction, InstructionGroup, Modes, Variant};
pub use report::{Diagnostic, EnrichReport};

/// Builds the database and runs the enrichment pass over it with the stock decoder and tables.
pub fn enriched_database() -> Result<(Vec<InstructionGroup>, EnrichReport), DecodeError> {
    let mut groups = isa::db::database();
    let decoder = isa::m65::M65Decoder::new();
    let annotator = Annotator::default();
    let report = Enricher::new(&decoder, &annotator).run(&mut groups)?;
    Ok((groups, report))
}
