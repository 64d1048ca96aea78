//! Joining a sideband with the final-stage netlist.
//!
//! Physical design keeps the instance names of synthesized cells, so a plain
//! name lookup recovers the source span of every surviving logic cell. Cells
//! the sideband has never seen were inserted by physical design.

mod joiner;
mod report;

pub use joiner::{MISSING_REPORT_LIMIT, join_files, join_sideband};
pub use report::{
    AnnotatedCell, JoinReport, JoinStats, PhysicalCell, UnannotatedCell, UnannotatedReason,
};
