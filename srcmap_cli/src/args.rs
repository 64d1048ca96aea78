use std::path::PathBuf;

use clap::{Parser, Subcommand};
use srcmap_common::{ExtractOptions, ValidationConfig};

/// srcmap - Recover source locations of placed cells
#[derive(Parser, Debug)]
#[command(name = "srcmap")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a source sideband from a Yosys JSON netlist
    Extract(ExtractArgs),
    /// Join a sideband with a post-PnR netlist and write a report
    Join(JoinArgs),
    /// Validate source annotation over a whole build-output directory
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExtractArgs {
    /// Yosys `write_json` netlist (e.g. design.nl.v.json)
    pub structured_netlist: PathBuf,
    /// Where to write the sideband JSON
    pub sideband_output: PathBuf,
    /// Textual netlist from the same synthesis run; found next to the JSON if omitted
    pub textual_netlist: Option<PathBuf>,
    /// Keep the structured cell names even if a textual sibling exists
    #[arg(long, default_value_t = false, conflicts_with = "textual_netlist")]
    pub no_sibling: bool,
}

#[derive(clap::Args, Debug)]
pub struct JoinArgs {
    /// Sideband JSON written by `extract`
    pub sideband: PathBuf,
    /// Final textual netlist from physical design
    pub final_netlist: PathBuf,
    /// Report destination; .json, .tsv and .csv select their formats, anything else is text
    pub output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Build-output directory containing numbered step directories
    pub run_dir: PathBuf,
    /// Minimum source coverage percentage
    #[arg(long, default_value_t = 50.0)]
    pub min_coverage: f64,
    /// Minimum cell name match percentage
    #[arg(long, default_value_t = 50.0)]
    pub min_cell_match: f64,
    /// Write a machine-readable JSON report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl ExtractArgs {
    /// Convert command-line arguments into extraction options
    pub fn to_options(&self) -> ExtractOptions {
        match (&self.textual_netlist, self.no_sibling) {
            (Some(path), _) => ExtractOptions::new().with_sibling(path),
            (None, true) => ExtractOptions::new().without_sibling(),
            (None, false) => ExtractOptions::new(),
        }
    }
}

impl ValidateArgs {
    /// Convert command-line arguments into validator configuration
    pub fn to_config(&self) -> ValidationConfig {
        ValidationConfig::new()
            .with_min_coverage(self.min_coverage)
            .with_min_cell_match(self.min_cell_match)
    }
}
