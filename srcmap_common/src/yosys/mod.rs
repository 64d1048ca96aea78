//! Yosys `write_json` netlists.
//!
//! This module provides the document model for the structured netlist emitted
//! by synthesis, and the naming convention that links it to the textual
//! netlist written by the same run.

mod design_path;
mod module;

pub use design_path::{STRUCTURED_SUFFIX, is_structured_netlist, sibling_netlist_path};
pub use module::{CellList, SRC_ATTRIBUTE, YosysCell, YosysDesign, YosysModule};
