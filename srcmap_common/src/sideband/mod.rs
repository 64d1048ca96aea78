//! Name-to-source sideband extracted from a synthesis run.
//!
//! The sideband maps each synthesized cell instance to its type and, when
//! Yosys recorded one, the source span it was elaborated from. It is written
//! once per synthesis run and read by the join stage.

mod extract;
mod record;

pub use extract::{
    CrossReference, ExtractOptions, Extraction, SiblingNetlist, TypeMismatch, extract_from_design,
    extract_sideband, verify_correspondence,
};
pub use record::{CellRecord, Sideband, SidebandMetadata};
