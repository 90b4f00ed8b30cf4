use std::process::ExitCode;

use anyhow::{Context, Result};
use log::info;
use vcf_sieve::{FilterOptions, FilterSummary, RecordFilter, filter_path};

mod cli;

fn run() -> Result<FilterSummary> {
    let args = cli::parse_cli();

    let predicate = args.predicate().context("invalid filter options")?;
    let options = FilterOptions {
        header_prefix: args.header_prefix.clone(),
        ..Default::default()
    };
    let filter = RecordFilter::with_options(predicate, options);

    let summary = filter_path(&args.input, &args.output, &filter, args.atomic).with_context(
        || {
            format!(
                "failed to filter {} into {}",
                args.input.display(),
                args.output.display()
            )
        },
    )?;

    info!(
        "{} lines read: {} headers, {} data lines kept, {} dropped",
        summary.lines_read, summary.headers, summary.kept, summary.dropped
    );
    Ok(summary)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
