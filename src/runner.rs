//! Suite runner: executes test cases one after another and tallies verdicts.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use colored::Colorize;
use log::{debug, info, warn};

use crate::compare::fire_and_compare;
use crate::config::Config;
use crate::error_handling::Failure;
use crate::matcher::{check, RequirementSet};
use crate::request::RequestSpec;
use crate::spec_file::load_spec_file;
use crate::transport::ConnectTo;
use crate::verdict::Verdict;

/// One executable test: a request, its requirements and an optional backend
/// to compare against.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Description from the spec file
    pub name: String,
    /// Request to fire
    pub spec: RequestSpec,
    /// Expectations on the response
    pub requirements: RequirementSet,
    /// When set, the response is also compared against this backend
    pub connect_to: Option<ConnectTo>,
}

impl TestCase {
    /// One-line summary: `"<description> (<METHOD> <url>)"`.
    pub fn describe(&self) -> String {
        format!("{} ({} {})", self.name, self.spec.method(), self.spec.url())
    }

    /// Fires the request and reduces the outcome to a verdict.
    ///
    /// With a connect-to override the request goes through the dual-target
    /// comparator; otherwise it is fired once and checked.
    pub async fn run(&self, config: &Config) -> Verdict {
        debug!("Running '{}' ({})", self.describe(), self.spec.request_id());
        let outcome = match &self.connect_to {
            Some(connect_to) => {
                fire_and_compare(&self.spec, &self.requirements, connect_to, config).await
            }
            None => self.fire_and_check(config).await,
        };
        Verdict::from(outcome)
    }

    async fn fire_and_check(&self, config: &Config) -> Result<(), Failure> {
        let result = self.spec.fire(config).await?;
        check(&result, &self.requirements, &config.template())?;
        Ok(())
    }
}

/// Summary of a run over one or more spec files.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Number of test cases executed
    pub total: usize,
    /// Number that passed
    pub passed: usize,
    /// Number that failed
    pub failed: usize,
    /// Wall-clock duration of the run
    pub elapsed_seconds: f64,
}

impl RunReport {
    /// True when no test failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Loads and runs every test of `files`, in order.
///
/// With `config.verbose` each test prints a green `✓` or red `✗` line with
/// its description, plus the failure reason. Failures are also logged at
/// `warn`.
///
/// # Errors
///
/// Returns an error if a spec file cannot be read or parsed. Test failures are
/// not errors; they are counted in the report.
pub async fn run_spec_files(files: &[PathBuf], config: &Config) -> Result<RunReport> {
    let started = Instant::now();
    let mut total = 0;
    let mut failed = 0;

    for path in files {
        let tests = load_spec_file(path, config)?;
        info!("Loaded {} tests from {}", tests.len(), path.display());

        for test in &tests {
            let verdict = test.run(config).await;
            total += 1;

            if let Some(reason) = verdict.reason() {
                failed += 1;
                warn!("{}: {}", test.describe(), reason);
            }

            if config.verbose {
                match verdict.reason() {
                    None => println!("{} {}", "✓".green(), test.describe()),
                    Some(reason) => {
                        println!("{} {}", "✗".red(), test.describe());
                        println!("    {}", reason.dimmed());
                    }
                }
            }
        }
    }

    Ok(RunReport {
        total,
        passed: total - failed,
        failed,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    })
}
