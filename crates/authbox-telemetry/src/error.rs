//! Logging setup failures.

use thiserror::Error;

/// Result alias for logging setup.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Failures raised while preparing console logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed, or installation failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Error reported by `tracing-subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// `--log-format` named something other than `json` or `pretty`.
    #[error("unknown log format")]
    UnknownFormat {
        /// Name as given.
        value: String,
    },
}
