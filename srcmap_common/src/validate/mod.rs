//! End-to-end check that source spans survive synthesis and physical design.
//!
//! Given a build-output tree, the validator finds the synthesis JSON and the
//! latest textual netlist, extracts a sideband, joins it, and compares the
//! resulting cell-name match and coverage against thresholds.

mod config;
mod locate;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

pub use config::{ArtifactPatterns, ValidationConfig};
pub use locate::{find_final_netlist, find_structured_netlist, step_index};

use crate::error::{ArtifactKind, Result, SrcMapError, write_all};
use crate::join::{JoinStats, join_files};
use crate::sideband::{CrossReference, ExtractOptions, SidebandMetadata, extract_sideband};
use crate::util::percent;

/// Number of missing names shown in a validation report.
pub const SAMPLE_MISSING_LIMIT: usize = 10;

/// One threshold comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCheck {
    /// Label used in the report.
    pub name: String,
    /// Measured percentage.
    pub actual: f64,
    /// Required percentage.
    pub threshold: f64,
    /// `actual >= threshold`.
    pub passed: bool,
}

impl ThresholdCheck {
    /// Compares `actual` against `threshold`.
    pub fn evaluate(name: impl Into<String>, actual: f64, threshold: f64) -> Self {
        Self {
            name: name.into(),
            actual,
            threshold,
            passed: actual >= threshold,
        }
    }
}

impl fmt::Display for ThresholdCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            write!(
                f,
                "PASS: {} {:.1}% >= {:.1}% threshold",
                self.name, self.actual, self.threshold
            )
        } else {
            write!(
                f,
                "FAIL: {} {:.1}% < {:.1}% threshold",
                self.name, self.actual, self.threshold
            )
        }
    }
}

/// Everything a validation run measured. `Display` gives the human report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Synthesis JSON that was used.
    pub structured_netlist: PathBuf,
    /// Final textual netlist that was used.
    pub final_netlist: PathBuf,
    /// Extraction counts.
    pub synthesis: SidebandMetadata,
    /// Cross-reference outcome of the extraction.
    pub cross_reference: CrossReference,
    /// Join counts.
    pub join: JoinStats,
    /// Synthesis cells found by name in the final netlist.
    pub cells_matched: usize,
    /// `100 * cells_matched / total synthesis cells`.
    pub cell_match_pct: f64,
    /// Cell-name match check.
    pub cell_match: ThresholdCheck,
    /// Source coverage check.
    pub coverage: ThresholdCheck,
    /// Up to [`SAMPLE_MISSING_LIMIT`] names missing from the final netlist.
    pub sample_missing: Vec<String>,
    /// Both checks passed.
    pub passed: bool,
}

impl ValidationReport {
    /// Writes the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        write_all(path, text.as_bytes())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "End-to-End Source Annotation Validation")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Structured netlist:    {}", file_name(&self.structured_netlist))?;
        writeln!(f, "Final netlist:         {}", file_name(&self.final_netlist))?;
        writeln!(f, "Cross-reference:       {}", self.cross_reference)?;
        writeln!(f)?;
        writeln!(f, "Synthesis cells:       {}", self.synthesis.total_cells)?;
        writeln!(f, "  with source span:    {}", self.synthesis.annotated_cells)?;
        writeln!(f, "Final cells:           {}", self.join.total_final_cells)?;
        writeln!(f, "  physical (added):    {}", self.join.physical_cells_added)?;
        writeln!(f, "  logic:               {}", self.join.logic_cells)?;
        writeln!(f, "Annotated after join:  {}", self.join.annotated)?;
        writeln!(f, "Unannotated:           {}", self.join.unannotated)?;
        writeln!(f, "Missing from final:    {}", self.join.cells_missing_from_final)?;
        writeln!(f)?;
        writeln!(
            f,
            "Cell name match:       {}/{} ({:.1}%)",
            self.cells_matched, self.synthesis.total_cells, self.cell_match_pct
        )?;
        writeln!(
            f,
            "Source coverage:       {}/{} ({:.1}%)",
            self.join.annotated, self.join.logic_cells, self.join.coverage_pct
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.cell_match)?;
        writeln!(f, "{}", self.coverage)?;

        if !self.sample_missing.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "Sample cells missing from final netlist (first {}):",
                SAMPLE_MISSING_LIMIT
            )?;
            for name in &self.sample_missing {
                writeln!(f, "  - {name}")?;
            }
        }

        Ok(())
    }
}

/// Runs extraction and join over a build tree and checks both thresholds.
///
/// A threshold miss is reported through [`ValidationReport::passed`], not as
/// an error.
///
/// # Errors
///
/// Fails when `run_dir` is not a directory, when either artifact cannot be
/// located, or when any artifact cannot be read or parsed.
pub fn validate(run_dir: &Path, config: &ValidationConfig) -> Result<ValidationReport> {
    if !run_dir.is_dir() {
        error!("Build output directory does not exist: {}", run_dir.display());
        return Err(SrcMapError::NotADirectory {
            path: run_dir.to_path_buf(),
        });
    }

    info!("Searching for structured netlist in {}", run_dir.display());
    let Some(structured) = find_structured_netlist(run_dir, &config.patterns)? else {
        error!("No structured netlist found in {}", run_dir.display());
        return Err(SrcMapError::ArtifactNotFound {
            kind: ArtifactKind::StructuredNetlist,
            root: run_dir.to_path_buf(),
        });
    };
    info!("Found structured netlist: {}", structured.display());

    info!("Searching for final netlist in {}", run_dir.display());
    let Some(final_netlist) = find_final_netlist(run_dir, &config.patterns)? else {
        error!("No final netlist found in {}", run_dir.display());
        return Err(SrcMapError::ArtifactNotFound {
            kind: ArtifactKind::FinalNetlist,
            root: run_dir.to_path_buf(),
        });
    };
    info!("Found final netlist: {}", final_netlist.display());

    let extraction = extract_sideband(&structured, &ExtractOptions::default())?;
    let synthesis = extraction.sideband.metadata;
    if synthesis.total_cells == 0 {
        warn!("No cells found in {}", structured.display());
    }

    let joined = {
        let mut builder = tempfile::Builder::new();
        builder.prefix("srcmap_sideband_").suffix(".json").rand_bytes(4);
        let temp_dir = config.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
        let sideband_file = builder
            .tempfile_in(&temp_dir)
            .map_err(|e| SrcMapError::io(&temp_dir, e))?;

        extraction.sideband.write_to(sideband_file.path())?;
        join_files(sideband_file.path(), &final_netlist)?
    };

    let cells_matched = synthesis
        .total_cells
        .saturating_sub(joined.stats.cells_missing_from_final);
    let cell_match_pct = percent(cells_matched, synthesis.total_cells);

    let cell_match =
        ThresholdCheck::evaluate("Cell name match", cell_match_pct, config.min_cell_match);
    let coverage = ThresholdCheck::evaluate(
        "Source coverage",
        joined.stats.coverage_pct,
        config.min_coverage,
    );
    let passed = cell_match.passed && coverage.passed;

    Ok(ValidationReport {
        structured_netlist: structured,
        final_netlist,
        synthesis,
        cross_reference: extraction.cross_reference,
        join: joined.stats,
        cells_matched,
        cell_match_pct,
        cell_match,
        coverage,
        sample_missing: joined
            .missing_from_final
            .into_iter()
            .take(SAMPLE_MISSING_LIMIT)
            .collect(),
        passed,
    })
}
