//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `http_test` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use http_test::config::Opt;
use http_test::initialization::{init_crypto_provider, init_logger_with};
use http_test::{run_spec_files, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting HTTP_TEST_DOMAIN in .env without exporting it manually
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    let config = Config::from(&opt);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    match run_spec_files(&opt.files, &config).await {
        Ok(report) => {
            println!(
                "{} Ran {} test{} ({} passed, {} failed) in {:.1}s",
                if report.is_success() { "✅" } else { "❌" },
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.passed,
                report.failed,
                report.elapsed_seconds
            );
            if !report.is_success() {
                process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("http_test error: {:#}", e);
            process::exit(1);
        }
    }
}
