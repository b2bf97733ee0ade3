// ── Core error types ──
//
// Caller-facing errors from totalconnect-core. Consumers never see raw
// HTTP statuses or parse failures directly; the `From<totalconnect_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.
// Status-class operations absorb all of these into `ArmingState::Unknown`;
// command-class operations surface them.

use thiserror::Error;

use totalconnect_api::ResultCode;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Credential rejected or the identity endpoint was unreachable.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The account has no location (or no security device) to operate on.
    #[error("No location is available on this account")]
    NoLocation,

    /// An arm/disarm command returned a terminal non-success result.
    #[error("Command rejected by the panel: {code}")]
    CommandRejected { code: ResultCode },

    /// Transport-level connection failure.
    #[error("Cannot reach the panel service: {reason}")]
    ConnectionFailed { reason: String },

    /// A request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Residual upstream error (unexpected status, malformed payload).
    #[error("API error: {message}")]
    Api { message: String },

    /// Invalid construction-time configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<totalconnect_api::Error> for CoreError {
    fn from(err: totalconnect_api::Error) -> Self {
        match err {
            totalconnect_api::Error::Authentication { message } => {
                Self::AuthenticationFailed { message }
            }
            totalconnect_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout
                } else if e.is_connect() {
                    Self::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    Self::Api {
                        message: e.to_string(),
                    }
                }
            }
            totalconnect_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid URL: {e}"),
            },
            totalconnect_api::Error::Tls(reason) => Self::ConnectionFailed { reason },
            totalconnect_api::Error::Http { status, body } => Self::Api {
                message: format!("HTTP {status}: {body}"),
            },
            totalconnect_api::Error::Deserialization { message, .. } => Self::Api { message },
        }
    }
}
