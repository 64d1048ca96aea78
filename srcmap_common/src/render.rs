//! Output encodings for a [`JoinReport`].

use std::fmt;
use std::path::Path;

use crate::error::{Result, write_all};
use crate::join::JoinReport;

/// Number of missing names listed in the text report.
pub const TEXT_MISSING_LIMIT: usize = 10;

const RULE_WIDTH: usize = 60;

/// Report encoding, chosen from the destination file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    /// The whole report as JSON.
    Json,
    /// Annotated cells, tab separated.
    Tsv,
    /// Annotated cells, comma separated.
    Csv,
    /// Fixed-width summary for people.
    Text,
}

impl ReportFormat {
    /// `.json`, `.tsv` and `.csv` select their encodings; anything else is text.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => ReportFormat::Json,
            Some("tsv") => ReportFormat::Tsv,
            Some("csv") => ReportFormat::Csv,
            _ => ReportFormat::Text,
        }
    }
}

/// Encodes `report` entirely in memory.
pub fn render(report: &JoinReport, format: ReportFormat) -> Result<Vec<u8>> {
    match format {
        ReportFormat::Json => Ok(report.to_json_string()?.into_bytes()),
        ReportFormat::Tsv => render_table(report, b'\t'),
        ReportFormat::Csv => render_table(report, b','),
        ReportFormat::Text => Ok(render_text(report).into_bytes()),
    }
}

/// Writes `report` to `path` in the encoding its extension selects.
pub fn write_report(report: &JoinReport, path: &Path) -> Result<ReportFormat> {
    let format = ReportFormat::from_path(path);
    let bytes = render(report, format)?;
    write_all(path, &bytes)?;
    tracing::info!("Wrote {:?} report to {}", format, path.display());
    Ok(format)
}

/// Annotated cells as a delimited table with a header row.
pub fn render_table(report: &JoinReport, delimiter: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(&mut buffer);

        writer.write_record(["cell_name", "final_type", "synth_type", "source_span"])?;
        for cell in &report.annotated {
            writer.write_record([
                cell.cell_name.as_str(),
                cell.final_type.as_str(),
                cell.synth_type.as_str(),
                cell.source_span.as_str(),
            ])?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(buffer)
}

/// The fixed-width text report as a string.
pub fn render_text(report: &JoinReport) -> String {
    report.to_string()
}

/// Writes the fixed-width text report: statistics, an optional warning with
/// up to [`TEXT_MISSING_LIMIT`] missing names, then the annotated cells.
pub fn write_text(out: &mut impl fmt::Write, report: &JoinReport) -> fmt::Result {
    let stats = &report.stats;

    writeln!(out, "Source Annotation Report")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;
    writeln!(out, "Total final cells:      {}", stats.total_final_cells)?;
    writeln!(out, "Physical cells added:   {}", stats.physical_cells_added)?;
    writeln!(out, "Logic cells:            {}", stats.logic_cells)?;
    writeln!(out, "Annotated with source:  {}", stats.annotated)?;
    writeln!(out, "Unannotated:            {}", stats.unannotated)?;
    writeln!(out, "Coverage:               {:.1}%", stats.coverage_pct)?;
    writeln!(out)?;

    if stats.cells_missing_from_final > 0 {
        writeln!(
            out,
            "WARNING: {} synthesis cells not found in final netlist",
            stats.cells_missing_from_final
        )?;
        for name in report.missing_from_final.iter().take(TEXT_MISSING_LIMIT) {
            writeln!(out, "  - {name}")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Annotated Cells")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "{:<20} {:<30} {}", "cell_name", "final_type", "source_span")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for cell in &report.annotated {
        writeln!(
            out,
            "{:<20} {:<30} {}",
            cell.cell_name, cell.final_type, cell.source_span
        )?;
    }

    Ok(())
}

impl fmt::Display for JoinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_text(f, self)
    }
}
