//! Error type returned by view operations.
//!
//! By the time a view returns one of these, the failure has already been
//! surfaced through the console context (toast, navigation or log line).

use authbox_api_models::ErrorBody;
use thiserror::Error;

use crate::gateway::ExpirySignal;
use crate::notice::ACCESS_DENIED_MESSAGE;

/// Convenience alias for view operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Terminal failure of one console operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConsoleError {
    /// Pre-submit validation failed; no request was sent.
    #[error("validation failed")]
    Validation {
        /// Message shown to the user.
        message: String,
    },
    /// The session is gone and the console navigated away.
    #[error("session expired")]
    SessionExpired {
        /// How the expiry was detected.
        signal: ExpirySignal,
    },
    /// The server answered 403.
    #[error("access denied")]
    AccessDenied,
    /// The server rejected the request with an error body.
    #[error("request rejected by server")]
    Business {
        /// Error payload as returned by the server.
        body: ErrorBody,
    },
    /// The request failed without a usable answer.
    #[error("request failed")]
    Transport {
        /// Diagnostic detail.
        detail: String,
    },
}

impl ConsoleError {
    /// Validation failure with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Process exit code for the terminal front-end.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::SessionExpired { .. } => 4,
            Self::AccessDenied | Self::Business { .. } | Self::Transport { .. } => 3,
        }
    }

    /// Message suitable for the terminal.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::SessionExpired {
                signal: ExpirySignal::LoginPage,
            } => "session expired; sign in again".to_string(),
            Self::SessionExpired {
                signal: ExpirySignal::ConnectionLost,
            } => "no response from server; sign in again".to_string(),
            Self::AccessDenied => ACCESS_DENIED_MESSAGE.to_string(),
            Self::Business { body } if body.error.is_empty() => body.message.clone(),
            Self::Business { body } => format!("{} ({})", body.message, body.error),
            Self::Transport { detail } => detail.clone(),
        }
    }

    /// Whether the failure was already shown to the user as a toast.
    #[must_use]
    pub const fn was_toasted(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::AccessDenied | Self::Business { .. }
        )
    }
}
