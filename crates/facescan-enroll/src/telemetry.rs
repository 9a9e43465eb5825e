use crate::config::TelemetryConfig;
use crate::enrollment::{CaptureResult, EnrollmentSession};
use tracing::Span;
use tracing_subscriber::filter::{LevelFilter, ParseError};
use tracing_subscriber::EnvFilter;

/// Targets that follow the configured level. Dependencies (reqwest, hyper, axum) are held at
/// `warn` so a `debug` run shows the handshake rather than connection-pool chatter.
const ENROLLMENT_TARGETS: [&str; 2] = ["facescan_enroll", "facescan_enroll_api"];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Install the global fmt subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// Filter used when `RUST_LOG` is unset.
///
/// A bare level (`debug`) is scoped to the enrollment crates; anything else is taken as a full
/// directive string.
pub fn default_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = match log_level.trim().parse::<LevelFilter>() {
        Ok(level) => scoped_directives(level),
        Err(_) => log_level.to_string(),
    };

    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
        value: log_level.to_string(),
        source,
    })
}

fn scoped_directives(level: LevelFilter) -> String {
    let baseline = level.min(LevelFilter::WARN);
    let level = level.to_string().to_ascii_lowercase();

    let mut directives = vec![baseline.to_string().to_ascii_lowercase()];
    directives.extend(
        ENROLLMENT_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Span covering one delivered capture result, from gate to directive.
pub fn session_span(session: &EnrollmentSession, result: &CaptureResult) -> Span {
    tracing::info_span!(
        "enrollment_session",
        session_id = %result.session_id(),
        status = %result.status(),
        group = %session.group_name,
    )
}
