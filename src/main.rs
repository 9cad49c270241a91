//! update-reporter - Reports outdated packages to notification services
//!
//! Reads an update check result (JSON) and dispatches it to every service
//! enabled in the host project manifest or the environment.

use anyhow::Context;
use clap::Parser;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use update_reporter::cli::CliArgs;
use update_reporter::config::ProjectMetadata;
use update_reporter::domain::UpdateCheckResult;
use update_reporter::error::AppError;
use update_reporter::options::Options;
use update_reporter::reporter::Reporter;

/// Default log filter when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let registry = args.registry()?;
    let metadata = load_metadata(&args)?;
    let result = read_result(&args)?;

    debug!(
        packages = result.len(),
        project = ?metadata.name,
        "update check result loaded"
    );

    let mut options = Options::new();
    if let Some(name) = &args.project_name {
        options = options.with_project_name(name.clone());
    }

    let mut reporter = Reporter::new(metadata).with_registry(registry);
    reporter.set_behavior(args.behavior());
    reporter.set_options(options);

    let summary = reporter.report(&result).await;

    if summary.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Partial success - at least one service failed
        Ok(ExitCode::from(2))
    }
}

/// Loads the host manifest; a missing default manifest yields empty metadata
fn load_metadata(args: &CliArgs) -> anyhow::Result<ProjectMetadata> {
    let path = args.manifest_path();

    if args.manifest.is_none() && !path.exists() {
        warn!(path = %path.display(), "manifest not found, using environment only");
        return Ok(ProjectMetadata::default());
    }

    Ok(ProjectMetadata::from_path(&path)?)
}

/// Reads the update check result from the given file or stdin
fn read_result(args: &CliArgs) -> anyhow::Result<UpdateCheckResult> {
    let (source_name, content) = match &args.result {
        Some(path) if !args.reads_stdin() => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            (path.display().to_string(), content)
        }
        _ => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("failed to read stdin")?;
            ("stdin".to_string(), content)
        }
    };

    let result = serde_json::from_str(&content).map_err(|e| AppError::InvalidResult {
        source_name,
        message: e.to_string(),
    })?;

    Ok(result)
}
