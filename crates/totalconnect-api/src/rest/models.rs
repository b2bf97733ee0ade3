// REST API response types
//
// Models for the newer JSON protocol. Field casing is inconsistent
// upstream (camelCase on location/device listings, PascalCase on panel
// status), so renames are explicit. `#[serde(default)]` is used liberally
// because field presence varies across panel firmware.

use serde::{Deserialize, Serialize};

// ── Token grant ──────────────────────────────────────────────────────

/// Response from the OAuth resource-owner-password grant.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
}

// ── Locations ────────────────────────────────────────────────────────

/// Response from `GET v1/locations`.
#[derive(Debug, Deserialize)]
pub struct LocationsResult {
    #[serde(rename = "locationDetailResult", default)]
    pub locations: Vec<LocationDetail>,
}

/// One account location and its security devices.
#[derive(Debug, Deserialize)]
pub struct LocationDetail {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeviceDetail>,
}

/// A security device within a location.
#[derive(Debug, Deserialize)]
pub struct DeviceDetail {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "deviceClass", default)]
    pub device_class: Option<String>,
}

// ── Panel status ─────────────────────────────────────────────────────

/// Response from `GET v1/locations/{loc}/partitions/fullStatus`.
///
/// The top-level `ArmingState` is the panel-global state; the per-partition
/// states live under `PanelStatus.Partitions`. Partition ids are NOT
/// returned as a plain list — they must be inferred from the zone entries.
#[derive(Debug, Deserialize)]
pub struct FullStatus {
    #[serde(rename = "ArmingState", default)]
    pub arming_state: i32,
    #[serde(rename = "PanelStatus", default)]
    pub panel_status: PanelStatus,
}

/// Nested panel status block.
#[derive(Debug, Default, Deserialize)]
pub struct PanelStatus {
    #[serde(rename = "Zones", default)]
    pub zones: Vec<ZoneStatus>,
    #[serde(rename = "Partitions", default)]
    pub partitions: Vec<PartitionStatus>,
    #[serde(rename = "IsInACLoss", default)]
    pub is_in_ac_loss: bool,
    #[serde(rename = "IsInLowBattery", default)]
    pub is_in_low_battery: bool,
    #[serde(rename = "IsCoverTampered", default)]
    pub is_cover_tampered: bool,
}

/// One zone entry. Zones reference the partition they belong to, which is
/// how the partition id list is recovered.
#[derive(Debug, Deserialize)]
pub struct ZoneStatus {
    #[serde(rename = "PartitionID", default)]
    pub partition_id: i64,
    #[serde(rename = "ZoneID", default)]
    pub zone_id: i64,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-partition status entry.
#[derive(Debug, Deserialize)]
pub struct PartitionStatus {
    #[serde(rename = "PartitionID", default)]
    pub partition_id: i64,
    #[serde(rename = "ArmingState", default)]
    pub arming_state: i32,
    #[serde(rename = "PartitionName", default)]
    pub name: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Commands ─────────────────────────────────────────────────────────

/// Body for the arm and disarm endpoints.
#[derive(Debug, Serialize)]
pub struct ArmRequest {
    #[serde(rename = "armType")]
    pub arm_type: i32,
    pub partitions: Vec<i64>,
    /// `-1` means "no user code" — commands run under the account's authority.
    #[serde(rename = "userCode")]
    pub user_code: i32,
}

/// Immediate response from arm/disarm and from the completion poll.
#[derive(Debug, Deserialize)]
pub struct CommandState {
    #[serde(rename = "ResultCode", default)]
    pub result_code: i32,
    #[serde(rename = "ResultData", default)]
    pub result_data: Option<String>,
}
