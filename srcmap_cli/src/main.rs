//! srcmap CLI
//!
//! Entry point for the source-annotation tools: sideband extraction from a
//! synthesis run, joining against the final netlist, and end-to-end
//! validation of a build-output directory.

#[global_allocator]
/// Global allocator using jemalloc.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod args;

use std::process::ExitCode;

use clap::Parser;
use srcmap_common::{is_structured_netlist, join_files, write_report};
use tracing::{error, info, warn};

use args::{Args, Command, ExtractArgs, JoinArgs, ValidateArgs};

fn run_extract(args: &ExtractArgs) -> srcmap_common::Result<bool> {
    if !is_structured_netlist(&args.structured_netlist) {
        warn!(
            "{} does not look like a JSON netlist",
            args.structured_netlist.display()
        );
    }

    let extraction = srcmap_common::extract_sideband(&args.structured_netlist, &args.to_options())?;
    extraction.sideband.write_to(&args.sideband_output)?;
    info!("Wrote sideband to {}", args.sideband_output.display());
    Ok(true)
}

fn run_join(args: &JoinArgs) -> srcmap_common::Result<bool> {
    let report = join_files(&args.sideband, &args.final_netlist)?;
    write_report(&report, &args.output)?;
    Ok(true)
}

fn run_validate(args: &ValidateArgs) -> srcmap_common::Result<bool> {
    let report = srcmap_common::validate(&args.run_dir, &args.to_config())?;

    println!();
    print!("{report}");
    println!();

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("Wrote validation report to {}", path.display());
    }

    if report.passed {
        println!("All checks passed.");
    }
    Ok(report.passed)
}

/// Executes the selected subcommand.
///
/// Returns 0 on success, 1 on a failed validation or any error.
fn run(args: &Args) -> ExitCode {
    let outcome = match &args.command {
        Command::Extract(args) => run_extract(args),
        Command::Join(args) => run_join(args),
        Command::Validate(args) => run_validate(args),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(&Args::parse())
}
