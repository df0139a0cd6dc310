//! Structured logging setup for flightdesk
//!
//! Logs go to stderr so the conversation on stdout stays readable. The
//! `tracing` subscriber is configured once per process.
//!
//! # Example
//!
//! ```no_run
//! use flightdesk::util::logging;
//!
//! // No flags given: reads FLIGHTDESK_LOG_LEVEL and FLIGHTDESK_LOG_FORMAT
//! logging::init_logging(logging::LoggingConfig::from_flags(None, false, false));
//!
//! use tracing::{debug, info};
//!
//! info!("Session started");
//! debug!(model = "glm-4", "Sending request");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Noisy transport crates capped unless `RUST_LOG` says otherwise
const QUIET_DEPENDENCIES: &[&str] = &["h2=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"];

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level for the `flightdesk` target
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., flightdesk::chat) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// JSON lines with source locations, for log collectors
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }

    /// Debug level with source locations, used for `--verbose`
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: true,
        }
    }

    /// Resolves the level from CLI flags, falling back to the environment.
    ///
    /// An explicit `--log-level` wins over `-v`/`-q`. `FLIGHTDESK_LOG_FORMAT=json`
    /// selects the production layout, `-v` the development one.
    pub fn from_flags(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let base = if json_requested() {
            Self::production()
        } else if verbose {
            Self::development()
        } else {
            Self::default()
        };

        let level = if let Some(level_str) = log_level {
            parse_level(level_str)
        } else if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            let level_str = env::var("FLIGHTDESK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            parse_level(&level_str)
        };

        Self { level, ..base }
    }
}

fn json_requested() -> bool {
    env::var("FLIGHTDESK_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Parses a log level from a string, case-insensitive.
///
/// Unknown values fall back to `Level::INFO`.
///
/// ```
/// use flightdesk::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("DEBUG"), Level::DEBUG);
/// assert_eq!(parse_level("chatty"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();

    if let Ok(directive) = format!("flightdesk={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    if env::var("RUST_LOG").is_err() {
        for rule in QUIET_DEPENDENCIES {
            if let Ok(directive) = rule.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}
