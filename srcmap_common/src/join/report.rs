use std::fmt;
use std::path::Path;

use contracts::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SrcMapError, read_to_string};
use crate::util::{percent, round1};

/// A surviving logic cell with its recovered source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedCell {
    /// Instance name in the final netlist.
    pub cell_name: String,
    /// Cell type after physical design.
    pub final_type: String,
    /// Cell type at synthesis.
    pub synth_type: String,
    /// Source span recorded by synthesis.
    pub source_span: String,
}

/// Why a synthesized cell has no span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnannotatedReason {
    /// Synthesis attached no `src` attribute.
    #[serde(rename = "no source span recorded")]
    NoSourceSpan,
}

impl fmt::Display for UnannotatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnannotatedReason::NoSourceSpan => write!(f, "no source span recorded"),
        }
    }
}

/// A synthesized cell that survived without a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnannotatedCell {
    /// Instance name in the final netlist.
    pub cell_name: String,
    /// Cell type after physical design.
    pub final_type: String,
    /// Cell type at synthesis.
    pub synth_type: String,
    /// Always [`UnannotatedReason::NoSourceSpan`] today.
    pub reason: UnannotatedReason,
}

/// A final-netlist cell with no synthesis counterpart (filler, decap, tap, buffer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalCell {
    /// Instance name in the final netlist.
    pub cell_name: String,
    /// Cell type in the final netlist.
    pub final_type: String,
}

/// Summary counts of a join.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinStats {
    /// Distinct instance names in the final netlist.
    pub total_final_cells: usize,
    /// Size of the physical-only partition.
    pub physical_cells_added: usize,
    /// Never below 1, so coverage is always defined.
    pub logic_cells: usize,
    /// Size of the annotated partition.
    pub annotated: usize,
    /// Size of the unannotated partition.
    pub unannotated: usize,
    /// `100 * annotated / logic_cells`, one decimal.
    pub coverage_pct: f64,
    /// Sideband names absent from the final netlist.
    pub cells_missing_from_final: usize,
}

/// Every final-netlist cell lands in exactly one of `annotated`,
/// `unannotated` or `physical_only`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinReport {
    /// Cells with a recovered span, sorted by name.
    pub annotated: Vec<AnnotatedCell>,
    /// Synthesized cells without a span, sorted by name.
    pub unannotated: Vec<UnannotatedCell>,
    /// Cells added by physical design, sorted by name.
    pub physical_only: Vec<PhysicalCell>,
    /// Truncated sample; the full count is in `stats`.
    pub missing_from_final: Vec<String>,
    /// Summary counts.
    pub stats: JoinStats,
}

impl JoinStats {
    /// Derives `logic_cells` and coverage from the partition sizes.
    #[requires(physical_cells_added <= total_final_cells)]
    #[ensures(ret.logic_cells >= 1)]
    pub fn new(
        total_final_cells: usize,
        physical_cells_added: usize,
        annotated: usize,
        unannotated: usize,
        cells_missing_from_final: usize,
    ) -> Self {
        let logic_cells = total_final_cells.saturating_sub(physical_cells_added).max(1);
        Self {
            total_final_cells,
            physical_cells_added,
            logic_cells,
            annotated,
            unannotated,
            coverage_pct: round1(percent(annotated, logic_cells)),
            cells_missing_from_final,
        }
    }
}

impl JoinReport {
    /// Number of final-netlist cells across the three partitions.
    pub fn partitioned_cells(&self) -> usize {
        self.annotated.len() + self.unannotated.len() + self.physical_only.len()
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// Loads a report written in the JSON encoding.
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| SrcMapError::json(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logic_cells_floor() {
        let stats = JoinStats::new(4, 4, 0, 0, 0);
        assert_eq!(stats.logic_cells, 1);
        assert_eq!(stats.coverage_pct, 0.0);

        let empty = JoinStats::new(0, 0, 0, 0, 3);
        assert_eq!(empty.logic_cells, 1);
    }

    #[test]
    fn test_coverage_against_logic_cells() {
        let stats = JoinStats::new(12, 2, 8, 2, 0);
        assert_eq!(stats.logic_cells, 10);
        assert_eq!(stats.coverage_pct, 80.0);
    }

    #[test]
    fn test_reason_wire_form() {
        let json = serde_json::to_string(&UnannotatedReason::NoSourceSpan).unwrap();
        assert_eq!(json, r#""no source span recorded""#);
        assert_eq!(UnannotatedReason::NoSourceSpan.to_string(), "no source span recorded");
    }
}
