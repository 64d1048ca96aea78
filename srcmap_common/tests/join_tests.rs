#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use std::collections::HashSet;
use std::fs;

use indexmap::IndexMap;
use quickcheck::{Arbitrary, Gen, quickcheck};
use rstest::rstest;
use srcmap_common::{
    CellRecord, JoinReport, MISSING_REPORT_LIMIT, ParsedCell, ReportFormat, Sideband,
    SidebandMetadata, UnannotatedReason, join_files, join_sideband, render, write_report,
};
use tempfile::tempdir;

mod common;
use common::{init_test_logger, verilog_netlist, write};

fn sideband(entries: &[(&str, &str, Option<&str>)]) -> Sideband {
    let cells: IndexMap<String, CellRecord> = entries
        .iter()
        .map(|(name, ty, src)| (name.to_string(), CellRecord::new(*ty, src.map(str::to_owned))))
        .collect();
    let annotated = cells.values().filter(|r| r.is_annotated()).count();
    let total = cells.len();
    Sideband::new(cells, SidebandMetadata::new(total, annotated))
}

/// Ten synthesized cells (two without spans) plus two physical-only cells.
fn scenario() -> (Sideband, Vec<ParsedCell>) {
    let names: Vec<String> = (0..10).map(|i| format!("_{i:02}_")).collect();
    let spans: Vec<String> = (0..10).map(|i| format!("top.v:{i}.1-{i}.9")).collect();
    let entries: Vec<_> = names
        .iter()
        .zip(&spans)
        .enumerate()
        .map(|(i, (name, span))| {
            let span = (i != 4 && i != 9).then_some(span.as_str());
            (name.as_str(), "sky130_fd_sc_hd__nand2_1", span)
        })
        .collect();
    let sideband = sideband(&entries);

    let mut final_cells: Vec<ParsedCell> = names
        .iter()
        .map(|n| ParsedCell::new(n.as_str(), "sky130_fd_sc_hd__nand2_1"))
        .collect();
    final_cells.push(ParsedCell::new("FILLER_0_0", "sky130_fd_sc_hd__fill_1"));
    final_cells.insert(0, ParsedCell::new("TAP_5", "sky130_fd_sc_hd__tapvpwrvgnd_1"));
    (sideband, final_cells)
}

#[test]
fn test_scenario_partitions_and_stats() {
    init_test_logger();
    let (sideband, final_cells) = scenario();
    let report = join_sideband(&sideband, &final_cells);

    assert_eq!(report.annotated.len(), 8);
    assert_eq!(report.unannotated.len(), 2);
    assert!(
        report
            .unannotated
            .iter()
            .all(|c| c.reason == UnannotatedReason::NoSourceSpan)
    );
    let physical: Vec<_> = report.physical_only.iter().map(|c| c.cell_name.as_str()).collect();
    assert_eq!(physical, ["FILLER_0_0", "TAP_5"]);

    let stats = report.stats;
    assert_eq!(stats.total_final_cells, 12);
    assert_eq!(stats.physical_cells_added, 2);
    assert_eq!(stats.logic_cells, 10);
    assert_eq!(stats.annotated, 8);
    assert_eq!(stats.unannotated, 2);
    assert_eq!(stats.coverage_pct, 80.0);
    assert_eq!(stats.cells_missing_from_final, 0);
    assert!(report.missing_from_final.is_empty());
}

#[test]
fn test_partitions_are_sorted_by_name() {
    let (sideband, final_cells) = scenario();
    let report = join_sideband(&sideband, &final_cells);
    let names: Vec<_> = report.annotated.iter().map(|c| c.cell_name.clone()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn test_annotated_carries_both_types() {
    let sb = sideband(&[("_1_", "$_AND_", Some("a.v:1.1-1.5"))]);
    let report = join_sideband(&sb, &[ParsedCell::new("_1_", "sky130_fd_sc_hd__and2_1")]);
    let cell = &report.annotated[0];
    assert_eq!(cell.synth_type, "$_AND_");
    assert_eq!(cell.final_type, "sky130_fd_sc_hd__and2_1");
    assert_eq!(cell.source_span, "a.v:1.1-1.5");
}

#[test]
fn test_all_physical_cells_clamps_logic_cells() {
    let sb = sideband(&[("_1_", "x", Some("a.v:1.1-1.5"))]);
    let final_cells = [
        ParsedCell::new("FILLER_0", "fill"),
        ParsedCell::new("FILLER_1", "fill"),
    ];
    let report = join_sideband(&sb, &final_cells);
    assert_eq!(report.stats.physical_cells_added, 2);
    assert_eq!(report.stats.logic_cells, 1);
    assert_eq!(report.stats.coverage_pct, 0.0);
    assert_eq!(report.missing_from_final, ["_1_"]);
}

#[test]
fn test_missing_list_is_truncated_but_counted() {
    let names: Vec<String> = (0..30).map(|i| format!("gone_{i}")).collect();
    let entries: Vec<_> = names.iter().map(|n| (n.as_str(), "x", None)).collect();
    let report = join_sideband(&sideband(&entries), &[]);

    assert_eq!(report.stats.cells_missing_from_final, 30);
    assert_eq!(report.missing_from_final.len(), MISSING_REPORT_LIMIT);
    assert_eq!(report.missing_from_final[0], "gone_0");
    assert_eq!(report.stats.total_final_cells, 0);
    assert_eq!(report.stats.logic_cells, 1);
}

#[test]
fn test_json_report_round_trip() {
    let (sideband, final_cells) = scenario();
    let report = join_sideband(&sideband, &final_cells);

    let tmp = tempdir().unwrap();
    let path = tmp.path().join("report.json");
    assert_eq!(write_report(&report, &path).unwrap(), ReportFormat::Json);

    let decoded = JoinReport::read_from(&path).unwrap();
    assert_eq!(decoded, report);
}

#[test]
fn test_join_files_is_idempotent() {
    let tmp = tempdir().unwrap();
    let (sideband, final_cells) = scenario();
    let sb_path = tmp.path().join("sideband.json");
    sideband.write_to(&sb_path).unwrap();

    let pairs: Vec<(String, String)> = final_cells
        .iter()
        .map(|c| (c.instance_name.clone(), c.cell_type.clone()))
        .collect();
    let netlist = write(&tmp.path().join("final.nl.v"), &verilog_netlist(&pairs));

    let first = render(&join_files(&sb_path, &netlist).unwrap(), ReportFormat::Json).unwrap();
    let second = render(&join_files(&sb_path, &netlist).unwrap(), ReportFormat::Json).unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case("report.json", ReportFormat::Json)]
#[case("report.TSV", ReportFormat::Tsv)]
#[case("report.csv", ReportFormat::Csv)]
#[case("report.txt", ReportFormat::Text)]
#[case("report", ReportFormat::Text)]
fn test_output_format_from_extension(#[case] name: &str, #[case] expected: ReportFormat) {
    let (sideband, final_cells) = scenario();
    let report = join_sideband(&sideband, &final_cells);

    let tmp = tempdir().unwrap();
    let path = tmp.path().join(name);
    assert_eq!(write_report(&report, &path).unwrap(), expected);

    let written = fs::read_to_string(&path).unwrap();
    match expected {
        ReportFormat::Json => assert!(written.trim_start().starts_with('{')),
        ReportFormat::Tsv => {
            assert!(written.starts_with("cell_name\tfinal_type\tsynth_type\tsource_span\n"));
            assert_eq!(written.lines().count(), 1 + report.annotated.len());
        }
        ReportFormat::Csv => {
            assert!(written.starts_with("cell_name,final_type,synth_type,source_span\n"));
            assert_eq!(written.lines().count(), 1 + report.annotated.len());
        }
        ReportFormat::Text => assert!(written.starts_with("Source Annotation Report\n")),
    }
}

#[test]
fn test_unreadable_sideband_is_an_error() {
    let tmp = tempdir().unwrap();
    let sb = write(&tmp.path().join("sideband.json"), "not json");
    let netlist = write(&tmp.path().join("final.nl.v"), "");
    assert!(join_files(&sb, &netlist).is_err());
}

#[derive(Clone, Debug)]
struct JoinInput {
    sideband: Vec<(String, bool)>,
    final_names: Vec<String>,
}

impl Arbitrary for JoinInput {
    fn arbitrary(g: &mut Gen) -> Self {
        let pool = 24u8;
        let sideband = Vec::<(u8, bool)>::arbitrary(g)
            .into_iter()
            .map(|(n, annotated)| (format!("c{}", n % pool), annotated))
            .collect();
        let final_names = Vec::<u8>::arbitrary(g)
            .into_iter()
            .map(|n| format!("c{}", n % pool))
            .collect();
        Self {
            sideband,
            final_names,
        }
    }
}

quickcheck! {
    fn prop_partitions_are_exhaustive_and_disjoint(input: JoinInput) -> bool {
        let entries: Vec<_> = input
            .sideband
            .iter()
            .map(|(n, annotated)| (n.as_str(), "t", annotated.then_some("s.v:1.1-1.2")))
            .collect();
        let sb = sideband(&entries);
        let final_cells: Vec<_> = input
            .final_names
            .iter()
            .map(|n| ParsedCell::new(n.as_str(), "t"))
            .collect();
        let report = join_sideband(&sb, &final_cells);

        let unique: HashSet<&str> = input.final_names.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let all_names = report
            .annotated
            .iter()
            .map(|c| c.cell_name.as_str())
            .chain(report.unannotated.iter().map(|c| c.cell_name.as_str()))
            .chain(report.physical_only.iter().map(|c| c.cell_name.as_str()));
        let disjoint = all_names.into_iter().all(|n| seen.insert(n));

        disjoint
            && seen == unique
            && report.partitioned_cells() == report.stats.total_final_cells
            && report.stats.logic_cells
                == (report.stats.total_final_cells - report.stats.physical_cells_added).max(1)
    }

    fn prop_coverage_matches_formula(input: JoinInput) -> bool {
        let entries: Vec<_> = input
            .sideband
            .iter()
            .map(|(n, annotated)| (n.as_str(), "t", annotated.then_some("s.v:1.1-1.2")))
            .collect();
        let sb = sideband(&entries);
        let final_cells: Vec<_> = input
            .final_names
            .iter()
            .map(|n| ParsedCell::new(n.as_str(), "t"))
            .collect();
        let stats = join_sideband(&sb, &final_cells).stats;
        let pct = 100.0 * stats.annotated as f64 / stats.logic_cells as f64;
        let expected = (pct * 10.0).round() / 10.0;

        stats.coverage_pct == expected
            && sb.metadata.annotated_cells <= sb.metadata.total_cells
    }
}
