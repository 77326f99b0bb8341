// Main CLI entry point for mirrorprobe
// Uses clap for argument parsing

use anyhow::Context;
use colored::*;
use std::process::ExitCode;

use mirrorprobe::cli::{build_cli, options_from_matches};
use mirrorprobe::config::ScanConfig;
use mirrorprobe::engine::ProbeEngine;
use mirrorprobe::logging::init_logging;
use mirrorprobe::reporting::Reporter;
use mirrorprobe::scanner::Scanner;
use mirrorprobe::walker;

fn main() -> ExitCode {
    init_logging();

    let matches = build_cli().get_matches();
    let config = match ScanConfig::from_options(options_from_matches(&matches)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n{}\n", e.to_string().red());
            return ExitCode::from(2);
        }
    };

    match run(&config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("mirrorprobe error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Returns whether the walk completed.
fn run(config: &ScanConfig) -> anyhow::Result<bool> {
    let method = config.effective_method();
    if method != config.method {
        tracing::info!(from = %config.method, to = %method, "method upgraded for body-dependent filters");
    }

    let mut reporter = Reporter::stdout(config.report_path.as_deref()).with_context(|| {
        format!(
            "opening report file {}",
            config
                .report_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;

    // a failing count still lets the probing pass report what it reaches
    let estimate = walker::count(config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "counting pass stopped early");
        Default::default()
    });

    reporter.settings(config, method)?;
    reporter.start_banner(&estimate, config.delay)?;
    reporter.rule()?;

    let engine = ProbeEngine::new(config).context("building HTTP client")?;
    let (summary, outcome) = Scanner::new(config, &engine, &mut reporter).run();

    let completed = match outcome {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "walk aborted");
            reporter.error(&e.to_string())?;
            false
        }
    };

    reporter.note("")?;
    reporter.rule()?;
    reporter.end_banner(&summary)?;
    Ok(completed)
}
