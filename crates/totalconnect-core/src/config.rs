// ── Runtime connection configuration ──
//
// These types describe *how* to reach the panel service. They carry
// credential data and connection tuning, but never touch disk — the
// consumer constructs a `PanelConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use totalconnect_api::{Credentials, ProtocolGeneration, TlsMode};

/// Completion-polling cadence and bound.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Delay before the first completion poll. The legacy generation,
    /// which has no dedicated completion endpoint, also uses this as its
    /// fixed tick between full-status polls.
    pub initial_delay: Duration,
    /// Delay between subsequent completion polls (REST generation).
    pub interval: Duration,
    /// Maximum number of polls before giving up on a command.
    ///
    /// `None` preserves the upstream behavior of polling until the panel
    /// reports a terminal state, however long that takes — panels can
    /// legitimately spend minutes in exit delay.
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            interval: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

/// Configuration for a single panel client.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Which protocol generation to speak. Never mixed at runtime.
    pub generation: ProtocolGeneration,
    /// Account credential, held for the client's lifetime.
    pub credentials: Credentials,
    /// Resource base URL override. `None` uses the generation's
    /// production default.
    pub api_base: Option<Url>,
    /// Token endpoint override (REST generation only).
    pub token_url: Option<Url>,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Completion-polling cadence.
    pub poll: PollSettings,
}

impl PanelConfig {
    /// Config with production endpoints and default tuning.
    pub fn new(
        generation: ProtocolGeneration,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            generation,
            credentials: Credentials::new(username, password),
            api_base: None,
            token_url: None,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            poll: PollSettings::default(),
        }
    }
}
