//! Panel facade over the `totalconnect-api` protocol clients.
//!
//! This crate owns the business logic of driving one account's alarm
//! panel:
//!
//! - **[`Panel`]** — the consumer entry point. Resolves the account's
//!   location/device/partition topology on first use, answers
//!   [`get_status()`](Panel::get_status) with a generalized arming state
//!   (failure-tolerant: suitable for unattended timers), and executes
//!   [`arm_system()`](Panel::arm_system) commands whose completion is
//!   observed by polling the service until a terminal result.
//!
//! - **[`PanelConfig`]** — in-memory construction-time configuration:
//!   protocol generation, credentials, endpoint overrides, transport
//!   tuning, and the completion-poll cadence. Core never reads files.
//!
//! - **[`CoreError`]** — the caller-facing error taxonomy. Rejected
//!   commands surface as [`CoreError::CommandRejected`] naming the
//!   classified result; session expiry never crosses this boundary (the
//!   API clients recover it with a single re-auth retry).
//!
//! The generalized state vocabulary ([`ArmingState`], [`ArmTarget`],
//! [`ResultCode`]) is re-exported from `totalconnect-api`.

pub mod config;
pub mod error;
pub mod panel;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PanelConfig, PollSettings};
pub use error::CoreError;
pub use panel::{Panel, Topology};

// Re-export the state vocabulary for consumers.
pub use totalconnect_api::{
    ArmTarget, ArmingState, Credentials, ProtocolGeneration, ResultCode, TlsMode,
};
