use std::path::Path;

use contracts::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SrcMapError, read_to_string, write_all};
use crate::util::{percent, round1};

/// What synthesis knew about one cell instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Cell type as synthesis emitted it.
    #[serde(rename = "type", default)]
    pub cell_type: String,
    /// Opaque `<file>:<l>.<c>-<l>.<c>` string, kept verbatim.
    #[serde(default, alias = "src", skip_serializing_if = "Option::is_none")]
    pub source_span: Option<String>,
}

/// Counts taken during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SidebandMetadata {
    /// Cells seen across all design units, collisions included.
    pub total_cells: usize,
    /// Cells among those carrying a source span.
    pub annotated_cells: usize,
    /// `100 * annotated / total`, one decimal, 0 for an empty design.
    pub coverage_pct: f64,
}

/// Instance name to [`CellRecord`], in extraction order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sideband {
    /// Records keyed by instance name.
    #[serde(default)]
    pub cells: IndexMap<String, CellRecord>,
    /// Extraction counts.
    #[serde(default)]
    pub metadata: SidebandMetadata,
}

impl CellRecord {
    /// Creates a record; `None` means synthesis recorded no span.
    pub fn new(cell_type: impl Into<String>, source_span: Option<String>) -> Self {
        Self {
            cell_type: cell_type.into(),
            source_span,
        }
    }

    /// True when a non-empty span is present.
    pub fn is_annotated(&self) -> bool {
        self.source_span.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl SidebandMetadata {
    /// Derives coverage from the two counts.
    #[requires(annotated_cells <= total_cells)]
    #[ensures(ret.coverage_pct >= 0.0 && ret.coverage_pct <= 100.0)]
    pub fn new(total_cells: usize, annotated_cells: usize) -> Self {
        Self {
            total_cells,
            annotated_cells,
            coverage_pct: round1(percent(annotated_cells, total_cells)),
        }
    }
}

impl Default for SidebandMetadata {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Sideband {
    /// Assembles a sideband from records and their counts.
    pub fn new(cells: IndexMap<String, CellRecord>, metadata: SidebandMetadata) -> Self {
        Self { cells, metadata }
    }

    /// Record for `name`, if synthesis produced that instance.
    pub fn get(&self, name: &str) -> Option<&CellRecord> {
        self.cells.get(name)
    }

    /// True when `name` is a synthesized instance.
    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Number of distinct instance names.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no instance was recorded.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// Loads a sideband written by [`Sideband::write_to`].
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| SrcMapError::json(path, e))
    }

    /// Writes the pretty JSON form to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_all(path, self.to_json_string()?.as_bytes())
    }
}
