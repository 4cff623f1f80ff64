//! Logging set-up for the `webrank` binary.
//!
//! Events and closing spans go to `stderr`, so summaries and traces written
//! to `stdout` stay clean. Records sent through the `log` facade are bridged
//! into `tracing`.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::format::FmtSpan,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Environment variable selecting `human` or `json` log output.
pub const LOG_FORMAT_ENV: &str = "WEBRANK_LOG_FORMAT";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Errors raised while reading the logging configuration.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// [`LOG_FORMAT_ENV`] held bytes that are not UTF-8.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Underlying lookup failure.
        #[source]
        source: env::VarError,
    },
    /// [`LOG_FORMAT_ENV`] named a format other than `human` or `json`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Normalised value supplied by the user.
        provided: String,
    },
}

/// Rendering of log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text lines.
    #[default]
    Human,
    /// One JSON object per event, with the current span and its parents.
    Json,
}

impl LogFormat {
    /// Reads the format from [`LOG_FORMAT_ENV`]; unset means [`Self::Human`].
    ///
    /// # Errors
    /// Returns [`LoggingError`] when the variable is not Unicode or names an
    /// unknown format.
    pub fn from_env() -> Result<Self, LoggingError> {
        match env::var(LOG_FORMAT_ENV) {
            Ok(raw) => raw.parse(),
            Err(env::VarError::NotPresent) => Ok(Self::Human),
            Err(source) => Err(LoggingError::InvalidUnicode {
                name: LOG_FORMAT_ENV,
                source,
            }),
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

/// Installs the global subscriber once per process.
///
/// The level comes from `RUST_LOG` and defaults to `info`. When another
/// subscriber already owns the process, webrank keeps it and says so on
/// `stderr`.
///
/// # Errors
/// Returns [`LoggingError`] if [`LOG_FORMAT_ENV`] cannot be read as a
/// [`LogFormat`].
pub fn init_logging() -> Result<(), LoggingError> {
    if INITIALISED.get().is_some() {
        return Ok(());
    }
    let format = LogFormat::from_env()?;

    // another logger may already own the `log` slot
    LogTracer::init().ok();
    if let Err(err) = install(format) {
        report_existing_subscriber(&err);
    }
    INITIALISED.get_or_init(|| ());
    Ok(())
}

fn install(format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let events = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let events = match format {
        LogFormat::Human => events.boxed(),
        LogFormat::Json => events
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(events)
        .try_init()
}

#[expect(
    clippy::print_stderr,
    reason = "tracing is owned by another subscriber, so stderr is the only channel"
)]
fn report_existing_subscriber(err: &TryInitError) {
    eprintln!("keeping the tracing subscriber installed elsewhere: {err}");
}
