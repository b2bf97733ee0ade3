// ── Panel facade ──
//
// The single entry point for consumers: topology resolution, status
// queries, arm/disarm commands, and the asynchronous completion-polling
// loop. Wraps one protocol-generation client selected at construction.
//
// Commands complete asynchronously on the panel side; an accepted command
// starts (or attaches to) the one polling loop this instance may run at a
// time. Status queries are failure-tolerant by contract — they run
// unattended on consumer timers and must never error.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use url::Url;

use totalconnect_api::{
    ArmTarget, ArmingState, LegacyClient, ProtocolGeneration, RestClient, ResultCode,
    TransportConfig, rest,
};

use crate::config::{PanelConfig, PollSettings};
use crate::error::CoreError;

// ── Topology ─────────────────────────────────────────────────────────

/// Resolved account topology: one location, its security device, and the
/// device's partitions. Zero ids mean "not resolved".
///
/// Resolution happens at most once per client lifetime; there is no
/// invalidation path (an account whose location changes mid-session needs
/// a client restart).
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub location_id: i64,
    pub device_id: i64,
    pub partitions: Vec<i64>,
}

impl Topology {
    pub fn is_resolved(&self) -> bool {
        self.location_id != 0
    }
}

// ── Internals ────────────────────────────────────────────────────────

enum ApiClient {
    Rest(RestClient),
    Legacy(LegacyClient),
}

/// The one in-flight command slot. A second arm/disarm issued while a
/// poll loop runs attaches to this receiver instead of starting a second
/// timer chain.
struct PendingCommand {
    target: ArmTarget,
    done: watch::Receiver<Option<bool>>,
}

struct PanelInner {
    generation: ProtocolGeneration,
    client: ApiClient,
    poll: PollSettings,
    topology: Mutex<Topology>,
    pending: Mutex<Option<PendingCommand>>,
}

// ── Panel ────────────────────────────────────────────────────────────

/// Async client for one account's alarm panel.
///
/// Cheaply cloneable via `Arc`; all shared state (topology, session
/// material, the pending-command slot) is internally synchronized.
#[derive(Clone)]
pub struct Panel {
    inner: Arc<PanelInner>,
}

impl Panel {
    /// Build a panel client from configuration. No network traffic happens
    /// here; session material and topology are resolved lazily on first use.
    pub fn new(config: PanelConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
        };

        let base_url = match config.api_base {
            Some(url) => url,
            None => parse_default(config.generation.default_base_url())?,
        };

        let client = match config.generation {
            ProtocolGeneration::Rest => {
                let token_url = match config.token_url {
                    Some(url) => url,
                    None => parse_default(rest::DEFAULT_TOKEN_URL)?,
                };
                ApiClient::Rest(RestClient::new(
                    base_url,
                    token_url,
                    config.credentials,
                    &transport,
                )?)
            }
            ProtocolGeneration::Legacy => ApiClient::Legacy(LegacyClient::new(
                base_url,
                config.credentials,
                &transport,
            )?),
        };

        Ok(Self {
            inner: Arc::new(PanelInner {
                generation: config.generation,
                client,
                poll: config.poll,
                topology: Mutex::new(Topology::default()),
                pending: Mutex::new(None),
            }),
        })
    }

    /// The protocol generation this client speaks.
    pub fn generation(&self) -> ProtocolGeneration {
        self.inner.generation
    }

    /// A snapshot of the currently resolved topology.
    pub async fn topology(&self) -> Topology {
        self.inner.topology.lock().await.clone()
    }

    // ── Topology resolution ──────────────────────────────────────────

    /// Resolve the account's location, device, and partition ids.
    ///
    /// Memoized: once resolved, returns the cached location id with zero
    /// network calls. An account with no locations resolves to `0` — the
    /// caller treats that as "no status available", not an error.
    pub async fn resolve_location(&self) -> Result<i64, CoreError> {
        let mut topology = self.inner.topology.lock().await;
        if topology.is_resolved() {
            return Ok(topology.location_id);
        }

        match &self.inner.client {
            ApiClient::Rest(client) => {
                let listing = client.list_locations().await?;
                let Some(first) = listing.locations.first() else {
                    warn!("account has no locations");
                    return Ok(0);
                };
                topology.location_id = first.id;
                topology.device_id = first.devices.first().map_or(0, |d| d.id);

                // The locations listing carries no partitions; one status
                // call recovers them from the zone list.
                let status = client.full_status(topology.location_id).await?;
                topology.partitions =
                    distinct_partitions(status.panel_status.zones.iter().map(|z| z.partition_id));
            }
            ApiClient::Legacy(client) => {
                let details = client.session_details().await?;
                let code = ResultCode::classify(details.result_code);
                if code != ResultCode::Success {
                    return Err(CoreError::Api {
                        message: format!("session details failed: {code}"),
                    });
                }
                let Some(first) = details.locations.entries.first() else {
                    warn!("account has no locations");
                    return Ok(0);
                };
                topology.location_id = first.location_id;
                topology.device_id = first.security_device_id;

                let status = client.full_status(topology.device_id).await?;
                if let Some(panel) = status.panel {
                    topology.partitions = distinct_partitions(
                        panel.partitions.entries.iter().map(|p| p.partition_id),
                    );
                }
            }
        }

        info!(
            location_id = topology.location_id,
            device_id = topology.device_id,
            partitions = ?topology.partitions,
            "resolved account topology"
        );
        Ok(topology.location_id)
    }

    /// Resolve and require a usable topology for device-scoped commands.
    async fn ensure_topology(&self) -> Result<Topology, CoreError> {
        self.resolve_location().await?;
        let topology = self.topology().await;
        if !topology.is_resolved() || topology.device_id == 0 {
            return Err(CoreError::NoLocation);
        }
        Ok(topology)
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Current generalized arming state of the panel.
    ///
    /// Failure-tolerant: any transport, auth, or decoding failure is
    /// absorbed and reported as [`ArmingState::Unknown`] — this call runs
    /// unattended on consumer timers and must never error.
    pub async fn get_status(&self) -> ArmingState {
        match self.try_status().await {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "status query failed");
                ArmingState::Unknown
            }
        }
    }

    async fn try_status(&self) -> Result<ArmingState, CoreError> {
        let location_id = self.resolve_location().await?;
        if location_id == 0 {
            return Ok(ArmingState::Unknown);
        }

        match &self.inner.client {
            ApiClient::Rest(client) => {
                let status = client.full_status(location_id).await?;

                // The panel-global state, not the first partition's.
                let state = ArmingState::from_vendor(status.arming_state);
                debug!(code = status.arming_state, ?state, "panel status");

                // Partition ids are only carried by the zone list on this
                // endpoint; keep the cached set current.
                let partitions =
                    distinct_partitions(status.panel_status.zones.iter().map(|z| z.partition_id));
                if !partitions.is_empty() {
                    self.inner.topology.lock().await.partitions = partitions;
                }

                Ok(state)
            }
            ApiClient::Legacy(client) => {
                let device_id = self.topology().await.device_id;
                let status = client.full_status(device_id).await?;

                let code = ResultCode::classify(status.result_code);
                if !matches!(code, ResultCode::Success | ResultCode::Initiated) {
                    return Err(CoreError::Api {
                        message: format!("full status failed: {code}"),
                    });
                }

                let Some(panel) = status.panel else {
                    return Ok(ArmingState::Unknown);
                };
                // Legacy has no panel-global field; the first partition
                // carries the reportable state.
                let state = panel
                    .partitions
                    .entries
                    .first()
                    .map_or(ArmingState::Unknown, |p| {
                        ArmingState::from_vendor(p.arming_state)
                    });
                debug!(?state, "panel status");
                Ok(state)
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm or disarm the system and wait for the panel to complete the
    /// command.
    ///
    /// Returns `Ok(true)` once the panel confirms the command, `Ok(false)`
    /// if polling ends in a non-success terminal state, and
    /// [`CoreError::CommandRejected`] if the service refuses the command
    /// outright. A call issued while a previous command is still polling
    /// attaches to that command's completion rather than starting a second
    /// poll loop.
    pub async fn arm_system(&self, target: ArmTarget) -> Result<bool, CoreError> {
        let topology = self.ensure_topology().await?;

        info!(?target, "changing system state");
        let raw_code = self.send_command(target, &topology).await?;
        let code = ResultCode::classify(raw_code);
        debug!(code = raw_code, result = %code, "command response");

        if !matches!(code, ResultCode::Success | ResultCode::Initiated) {
            return Err(CoreError::CommandRejected { code });
        }

        self.await_completion(target).await
    }

    async fn send_command(
        &self,
        target: ArmTarget,
        topology: &Topology,
    ) -> Result<i32, CoreError> {
        match &self.inner.client {
            ApiClient::Rest(client) => {
                let arm_type = target.vendor_code(ProtocolGeneration::Rest);
                let state = if target == ArmTarget::Disarm {
                    client
                        .disarm(
                            topology.location_id,
                            topology.device_id,
                            arm_type,
                            &topology.partitions,
                        )
                        .await?
                } else {
                    client
                        .arm(
                            topology.location_id,
                            topology.device_id,
                            arm_type,
                            &topology.partitions,
                        )
                        .await?
                };
                Ok(state.result_code)
            }
            ApiClient::Legacy(client) => {
                let results = if target == ArmTarget::Disarm {
                    client
                        .disarm(topology.device_id, topology.location_id)
                        .await?
                } else {
                    client
                        .arm(
                            topology.device_id,
                            topology.location_id,
                            target.vendor_code(ProtocolGeneration::Legacy),
                        )
                        .await?
                };
                Ok(results.result_code)
            }
        }
    }

    // ── Completion polling ───────────────────────────────────────────

    /// Attach to the in-flight poll loop, or start one if the pending
    /// slot is empty, then wait for its resolution.
    async fn await_completion(&self, target: ArmTarget) -> Result<bool, CoreError> {
        let mut rx = {
            let mut pending = self.inner.pending.lock().await;
            if let Some(command) = pending.as_ref() {
                debug!(target = ?command.target, "attaching to in-flight command");
                command.done.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                let panel = self.clone();
                tokio::spawn(async move { panel.poll_command(target, tx).await });
                *pending = Some(PendingCommand {
                    target,
                    done: rx.clone(),
                });
                rx
            }
        };

        let resolved = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| CoreError::Api {
                message: "polling task ended without a result".into(),
            })?;
        Ok(resolved.unwrap_or(false))
    }

    /// The polling loop body. Runs as its own task; resolves the watch
    /// channel with the command outcome and clears the pending slot.
    async fn poll_command(&self, target: ArmTarget, tx: watch::Sender<Option<bool>>) {
        let settings = &self.inner.poll;
        let mut delay = settings.initial_delay;
        let mut attempts: u32 = 0;

        let outcome = loop {
            tokio::time::sleep(delay).await;
            attempts += 1;

            match self.poll_once(target).await {
                Ok(Some(success)) => break success,
                Ok(None) => {}
                // The panel may be mid-command; a failed poll is not a
                // failed command.
                Err(e) => warn!(error = %e, "command poll failed, will retry"),
            }

            if let Some(max) = settings.max_attempts {
                if attempts >= max {
                    warn!(attempts, "command did not reach a terminal state within the poll bound");
                    break false;
                }
            }

            // Legacy full-status polling keeps a fixed tick.
            if self.inner.generation == ProtocolGeneration::Rest {
                delay = settings.interval;
            }
        };

        info!(outcome, attempts, "command polling done");

        // Resolve and clear under one lock so late arrivers either see the
        // resolved value or start a fresh loop, never a stale slot.
        let mut pending = self.inner.pending.lock().await;
        let _ = tx.send(Some(outcome));
        pending.take();
    }

    /// One poll tick. `Ok(None)` means the command is still in flight.
    async fn poll_once(&self, target: ArmTarget) -> Result<Option<bool>, CoreError> {
        match &self.inner.client {
            ApiClient::Rest(client) => {
                let topology = self.topology().await;
                let state = client
                    .last_command_state(
                        topology.location_id,
                        topology.device_id,
                        &topology.partitions,
                    )
                    .await?;
                let code = ResultCode::classify(state.result_code);
                debug!(code = state.result_code, result = %code, "command poll");
                if code.is_pending() {
                    Ok(None)
                } else {
                    Ok(Some(code == ResultCode::Success))
                }
            }
            ApiClient::Legacy(client) => {
                // No dedicated completion endpoint: watch the full status
                // until the panel settles on a known state.
                let device_id = self.topology().await.device_id;
                let status = client.full_status(device_id).await?;
                let state = status
                    .panel
                    .and_then(|panel| {
                        panel
                            .partitions
                            .entries
                            .first()
                            .map(|p| ArmingState::from_vendor(p.arming_state))
                    })
                    .unwrap_or(ArmingState::Unknown);
                debug!(?state, "command poll");
                if state == ArmingState::Unknown {
                    Ok(None)
                } else {
                    Ok(Some(state == target.settled_state()))
                }
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn parse_default(url: &str) -> Result<Url, CoreError> {
    Url::parse(url).map_err(|e| CoreError::Config {
        message: format!("invalid base URL: {e}"),
    })
}

/// Distinct partition ids in first-seen order.
fn distinct_partitions(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = Vec::new();
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}
