//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{DEFAULT_DOMAIN, DEFAULT_HTTP_TIMEOUT_SECS, DOMAIN_ENV_VAR};
use crate::template::Template;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Run every test in a spec file
/// http_test tests/test_httpbin.yaml --verbose
///
/// # Compare production against one backend instance
/// http_test tests/test_httpbin.yaml --connect-to 10.0.0.12
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "http_test",
    about = "Runs declarative HTTP/WebSocket tests described in YAML files."
)]
pub struct Opt {
    /// YAML spec files to run
    #[arg(value_parser, required = true)]
    pub files: Vec<PathBuf>,

    /// Connect to this address instead of the host in each URL (Host/SNI unchanged).
    ///
    /// Accepts `ADDR`, `ADDR:PORT`, `[V6]:PORT` or curl's `HOST:PORT:ADDR:PORT`.
    /// Overrides any `connect_to` set in the spec files.
    #[arg(long)]
    pub connect_to: Option<String>,

    /// Print one line per test
    #[arg(short, long)]
    pub verbose: bool,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Domain substituted for `{{domain}}` in URLs, headers and expectations
    #[arg(long, env = DOMAIN_ENV_VAR, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// Everything the engine needs from the outside world is carried here, so no
/// component reads the process environment on its own.
///
/// # Examples
///
/// ```no_run
/// use http_test::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     domain: "staging.example.com".to_string(),
///     http_timeout: Duration::from_secs(5),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Overall timeout of one HTTP(S) fire
    pub http_timeout: Duration,

    /// Value substituted for the domain placeholder
    pub domain: String,

    /// Suite-wide connect-to override, replacing the one from spec files
    pub connect_to: Option<String>,

    /// Print one line per test
    pub verbose: bool,
}

impl Config {
    /// Returns the template substitution built from the configured domain.
    pub fn template(&self) -> Template {
        Template::new(&self.domain)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            log_format: LogFormat::Plain,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            domain: DEFAULT_DOMAIN.to_string(),
            connect_to: None,
            verbose: false,
        }
    }
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        Self {
            log_level: opt.log_level.clone(),
            log_format: opt.log_format.clone(),
            // A zero timeout would mean "fail immediately", clamp to one second
            http_timeout: Duration::from_secs(opt.timeout.max(1)),
            domain: opt.domain.clone(),
            connect_to: opt.connect_to.clone(),
            verbose: opt.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.domain, "example.com");
        assert!(config.connect_to.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_opt_parsing_into_config() {
        let opt = Opt::try_parse_from([
            "http_test",
            "tests/test_a.yaml",
            "tests/test_b.yaml",
            "--connect-to",
            "10.0.0.1:8443",
            "--timeout",
            "7",
            "--domain",
            "staging.example.org",
            "-v",
        ])
        .expect("valid command line");

        assert_eq!(opt.files.len(), 2);
        let config = Config::from(&opt);
        assert_eq!(config.connect_to.as_deref(), Some("10.0.0.1:8443"));
        assert_eq!(config.http_timeout, Duration::from_secs(7));
        assert_eq!(config.domain, "staging.example.org");
        assert!(config.verbose);
    }

    #[test]
    fn test_opt_zero_timeout_is_clamped() {
        let opt = Opt::try_parse_from(["http_test", "t.yaml", "--timeout", "0"])
            .expect("valid command line");
        assert_eq!(Config::from(&opt).http_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_opt_requires_files() {
        assert!(Opt::try_parse_from(["http_test"]).is_err());
    }
}
