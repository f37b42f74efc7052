// src/main.rs

use captionsweep::{
    assemble, AppError, CommandLineInput, LogObserver, ReqwestTransport, RunConfig, RunReport,
    StopSignal, TokioSleeper,
};
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("captionsweep.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Raises the stop signal on the first Ctrl-C. A second one kills the process.
fn install_interrupt_handler(stop: StopSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("⚠️  Interrupt received, finishing the current chunk...");
            stop.trigger();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        }
    });
}

/// Authenticates, walks the catalog and deletes captions, returning the report.
async fn execute_run(config: &RunConfig) -> Result<RunReport, AppError> {
    let stop = StopSignal::new();
    install_interrupt_handler(stop.clone());

    let transport = Arc::new(ReqwestTransport::new()?);
    let mut orchestrator = assemble(
        config,
        transport,
        Arc::new(TokioSleeper),
        Arc::new(LogObserver),
        stop,
    );
    orchestrator.run().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = RunConfig::resolve(cli)?;

    match execute_run(&config).await {
        Ok(report) => {
            println!();
            println!("{}", report.summary());
            log::debug!("Run id: {}", report.run_id);
            Ok(())
        }
        Err(e) => {
            log::error!("Run failed: {}", e);
            println!();
            println!("{}", RunReport::aborted_summary(&e));
            Err(e.into())
        }
    }
}
