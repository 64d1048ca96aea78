use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::join::{
    AnnotatedCell, JoinReport, JoinStats, PhysicalCell, UnannotatedCell, UnannotatedReason,
};
use crate::sideband::Sideband;
use crate::verilog::{ParsedCell, parse_netlist_file};

/// Longest list of missing names kept in a report.
pub const MISSING_REPORT_LIMIT: usize = 20;

/// Reads a sideband file and a final netlist and joins them.
///
/// # Errors
///
/// Fails when either file cannot be read or the sideband is not valid JSON.
pub fn join_files(sideband_path: &Path, netlist_path: &Path) -> Result<JoinReport> {
    info!("Reading sideband from {}", sideband_path.display());
    let sideband = Sideband::read_from(sideband_path)?;

    info!("Reading final netlist from {}", netlist_path.display());
    let final_cells = parse_netlist_file(netlist_path)?;

    let report = join_sideband(&sideband, &final_cells);
    let stats = &report.stats;
    info!(
        "Annotated {}/{} logic cells ({:.1}% coverage), {} physical cells added",
        stats.annotated, stats.logic_cells, stats.coverage_pct, stats.physical_cells_added
    );
    Ok(report)
}

/// Partitions the final netlist's cells against `sideband`.
pub fn join_sideband(sideband: &Sideband, final_cells: &[ParsedCell]) -> JoinReport {
    let mut by_name: BTreeMap<&str, &str> = BTreeMap::new();
    for cell in final_cells {
        if by_name
            .insert(cell.instance_name.as_str(), cell.cell_type.as_str())
            .is_some()
        {
            warn!(
                "Instance '{}' is instantiated more than once in the final netlist",
                cell.instance_name
            );
        }
    }

    let mut annotated = Vec::new();
    let mut unannotated = Vec::new();
    let mut physical_only = Vec::new();

    for (&name, &final_type) in &by_name {
        match sideband.get(name) {
            Some(record) => match record.source_span.as_deref().filter(|s| !s.is_empty()) {
                Some(span) => annotated.push(AnnotatedCell {
                    cell_name: name.to_string(),
                    final_type: final_type.to_string(),
                    synth_type: record.cell_type.clone(),
                    source_span: span.to_string(),
                }),
                None => unannotated.push(UnannotatedCell {
                    cell_name: name.to_string(),
                    final_type: final_type.to_string(),
                    synth_type: record.cell_type.clone(),
                    reason: UnannotatedReason::NoSourceSpan,
                }),
            },
            None => physical_only.push(PhysicalCell {
                cell_name: name.to_string(),
                final_type: final_type.to_string(),
            }),
        }
    }

    let final_names: HashSet<&str> = by_name.keys().copied().collect();
    let missing: Vec<&String> = sideband
        .cells
        .keys()
        .filter(|name| !final_names.contains(name.as_str()))
        .collect();

    if !missing.is_empty() {
        warn!(
            "{} synthesis cells not found in final netlist",
            missing.len()
        );
    }

    let stats = JoinStats::new(
        by_name.len(),
        physical_only.len(),
        annotated.len(),
        unannotated.len(),
        missing.len(),
    );

    JoinReport {
        annotated,
        unannotated,
        physical_only,
        missing_from_final: missing
            .into_iter()
            .take(MISSING_REPORT_LIMIT)
            .cloned()
            .collect(),
        stats,
    }
}
