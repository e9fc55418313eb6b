mod cli;

use anyhow::Context;
use clap::Parser;
use rawexr_rs::logger;
use rawexr_rs::raw_pipeline::Converter;

use tracing::{error, info};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(if cli.verbose { "debug" } else { "info" });

    info!("Starting rawexr...");

    let config = cli.to_config().context("Invalid configuration")?;
    info!(
        engine = %config.engine,
        workers = config.workers,
        exposure = config.exposure,
        output = %config.output_dir.display(),
        "Configuration loaded"
    );

    let converter = Converter::new(config);
    let summary = converter.run(&cli.inputs).context("Conversion aborted")?;

    for (source, reason) in &summary.failures {
        error!(source = %source.display(), "Failed: {}", reason);
    }
    info!(
        "{} converted, {} skipped, {} failed",
        summary.converted, summary.skipped, summary.failed
    );

    Ok(())
}
