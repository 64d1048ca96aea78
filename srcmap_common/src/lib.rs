//! Source-span recovery for placed-and-routed netlists.
//!
//! This crate extracts a name-to-source sideband from a synthesis run, joins
//! it with the final netlist of physical design, renders the resulting report,
//! and validates coverage over a whole build-output tree.

pub mod error;
pub mod join;
pub mod render;
pub mod sideband;
mod util;
pub mod validate;
pub mod verilog;
pub mod yosys;

pub use crate::error::{ArtifactKind, Result, SrcMapError};
pub use crate::join::*;
pub use crate::render::{ReportFormat, render, write_report};
pub use crate::sideband::*;
pub use crate::util::{percent, round1};
pub use crate::validate::{ArtifactPatterns, ValidationConfig, ValidationReport, validate};
pub use crate::verilog::{ParsedCell, parse_instantiations, parse_netlist_file};
pub use crate::yosys::*;
