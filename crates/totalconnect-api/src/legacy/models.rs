// Legacy API response types
//
// Models for the XML-bodied legacy protocol, deserialized with quick-xml.
// Every response carries a `ResultCode` element at its root; the root
// element name varies per endpoint but quick-xml only looks at children,
// so one struct per payload shape is enough.

use serde::Deserialize;

/// Minimal view of any legacy response, used by the transport layer to
/// detect the expired-session code before full decoding.
#[derive(Debug, Deserialize)]
pub struct ResultEnvelope {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
}

// ── Login ────────────────────────────────────────────────────────────

/// Payload of `AuthenticateLoginResults`.
#[derive(Debug, Deserialize)]
pub struct LoginResults {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultData", default)]
    pub result_data: Option<String>,
    #[serde(rename = "SessionID", default)]
    pub session_id: Option<String>,
}

// ── Session details (topology source) ────────────────────────────────

/// Payload of `SessionDetailResults`.
#[derive(Debug, Deserialize)]
pub struct SessionDetails {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "Locations", default)]
    pub locations: Locations,
}

/// Container of repeated `LocationInfoBasic` elements.
#[derive(Debug, Default, Deserialize)]
pub struct Locations {
    #[serde(rename = "LocationInfoBasic", default)]
    pub entries: Vec<LocationInfoBasic>,
}

/// One location with its security device id.
#[derive(Debug, Deserialize)]
pub struct LocationInfoBasic {
    #[serde(rename = "LocationID")]
    pub location_id: i64,
    #[serde(rename = "SecurityDeviceID")]
    pub security_device_id: i64,
    #[serde(rename = "LocationName", default)]
    pub name: Option<String>,
}

// ── Panel status ─────────────────────────────────────────────────────

/// Payload of `PanelMetadataAndStatusResults`.
#[derive(Debug, Deserialize)]
pub struct PanelStatusResults {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "PanelMetadataAndStatus", default)]
    pub panel: Option<PanelMetadata>,
}

/// Nested panel metadata block.
#[derive(Debug, Deserialize)]
pub struct PanelMetadata {
    #[serde(rename = "Partitions", default)]
    pub partitions: Partitions,
}

/// Container of repeated `PartitionInfo` elements.
#[derive(Debug, Default, Deserialize)]
pub struct Partitions {
    #[serde(rename = "PartitionInfo", default)]
    pub entries: Vec<PartitionInfo>,
}

/// Per-partition arming state.
#[derive(Debug, Deserialize)]
pub struct PartitionInfo {
    #[serde(rename = "PartitionID", default)]
    pub partition_id: i64,
    #[serde(rename = "ArmingState")]
    pub arming_state: i32,
}

// ── Commands ─────────────────────────────────────────────────────────

/// Payload of `ArmSecuritySystemResults` / `DisarmSecuritySystemResults`.
#[derive(Debug, Deserialize)]
pub struct CommandResults {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultData", default)]
    pub result_data: Option<String>,
}
