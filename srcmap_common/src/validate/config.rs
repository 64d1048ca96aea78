use std::path::PathBuf;

/// File-name conventions used to find artifacts inside a build tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPatterns {
    /// Structured netlist suffixes, most preferred first.
    pub structured_suffixes: Vec<String>,
    /// Directory-path marker that identifies the synthesis step.
    pub synthesis_marker: String,
    /// Suffix of textual netlists.
    pub final_suffix: String,
    /// Suffixes that end in `final_suffix` or sit beside it but are not final netlists.
    pub final_excluded_suffixes: Vec<String>,
}

impl Default for ArtifactPatterns {
    fn default() -> Self {
        Self {
            structured_suffixes: vec![".nl.v.json".to_string(), ".h.json".to_string()],
            synthesis_marker: "synthesis".to_string(),
            final_suffix: ".nl.v".to_string(),
            final_excluded_suffixes: vec![".json".to_string(), ".pnl.v".to_string()],
        }
    }
}

/// Thresholds and search conventions for [`crate::validate()`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Minimum source-span coverage of final logic cells, in percent.
    pub min_coverage: f64,
    /// Minimum share of synthesis cells found by name in the final netlist.
    pub min_cell_match: f64,
    /// How artifacts are recognised in the build tree.
    pub patterns: ArtifactPatterns,
    /// Directory for the intermediate sideband; the system default when `None`.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_coverage: 50.0,
            min_cell_match: 50.0,
            patterns: ArtifactPatterns::default(),
            temp_dir: None,
        }
    }
}

impl ValidationConfig {
    /// Defaults: 50% for both thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the coverage threshold, in percent.
    pub fn with_min_coverage(mut self, min_coverage: f64) -> Self {
        self.min_coverage = min_coverage;
        self
    }

    /// Sets the cell-name match threshold, in percent.
    pub fn with_min_cell_match(mut self, min_cell_match: f64) -> Self {
        self.min_cell_match = min_cell_match;
        self
    }

    /// Replaces the artifact naming conventions.
    pub fn with_patterns(mut self, patterns: ArtifactPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Places the intermediate sideband file in `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}
