// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk — shipping-label transform and print pipeline
//
// Entry point. One invocation processes one file out of the staging area and
// exits: 0 on success, 1 on a processing failure (evidence parked in
// failed/), 2 on bad arguments or configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use labelwerk_core::config::{LabelConfig, Transport};
use labelwerk_pipeline::Pipeline;
use labelwerk_print::NetworkDispatcher;

/// Process one incoming label file: classify, transform, and print it.
#[derive(Debug, Parser)]
#[command(name = "labelwerk", version, about)]
struct Args {
    /// File name to process (looked up under <BASEDIR>/incoming/).
    file: String,

    /// Staging base directory holding incoming/, original/, printed/, failed/.
    #[arg(env = "LABELWERK_BASEDIR", default_value = ".")]
    basedir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match LabelConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("labelwerk: configuration error: {}", err);
            return ExitCode::from(2);
        }
    };

    tracing::info!(
        file = %args.file,
        basedir = %args.basedir.display(),
        printer = %config.printer_host,
        "Labelwerk starting"
    );

    let dispatcher = NetworkDispatcher::new(
        config.printer_host.clone(),
        config.raw_port,
        config.lpr_port,
        config.printer_queue.clone(),
    );

    let pipeline = Pipeline::new(&config, &dispatcher);
    match pipeline.process(&args.file, &args.basedir).await {
        Ok(outcome) => {
            let target = match config.transport {
                Transport::Queue => format!("queue '{}'", config.printer_queue),
                Transport::Raw => format!("{}:{}", config.printer_host, config.raw_port),
            };
            println!(
                "{}: job {} sent to {} ({})",
                args.file,
                outcome.job_id,
                target,
                outcome.artifact.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("labelwerk: {}: {}", args.file, err);
            ExitCode::from(1)
        }
    }
}
