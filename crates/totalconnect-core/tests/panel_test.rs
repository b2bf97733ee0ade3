#![allow(clippy::unwrap_used)]
// Integration tests for `Panel` against a mocked service, covering both
// protocol generations: topology resolution, status queries, commands,
// and the completion-polling loop.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use totalconnect_core::{
    ArmTarget, ArmingState, CoreError, Panel, PanelConfig, PollSettings, ProtocolGeneration,
    ResultCode,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_poll() -> PollSettings {
    PollSettings {
        initial_delay: Duration::from_millis(10),
        interval: Duration::from_millis(10),
        max_attempts: Some(25),
    }
}

fn rest_panel(server: &MockServer, poll: PollSettings) -> Panel {
    let mut config = PanelConfig::new(
        ProtocolGeneration::Rest,
        "user@example.com",
        "hunter2".to_string().into(),
    );
    config.api_base = Some(Url::parse(&server.uri()).unwrap());
    config.token_url = Some(Url::parse(&format!("{}/token", server.uri())).unwrap());
    config.poll = poll;
    Panel::new(config).unwrap()
}

fn legacy_panel(server: &MockServer, poll: PollSettings) -> Panel {
    let mut config = PanelConfig::new(
        ProtocolGeneration::Legacy,
        "user@example.com",
        "hunter2".to_string().into(),
    );
    config.api_base = Some(Url::parse(&server.uri()).unwrap());
    config.poll = poll;
    Panel::new(config).unwrap()
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token_type": "Bearer", "access_token": "tok-1" })),
        )
        .mount(server)
        .await;
}

async fn mount_locations(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locationDetailResult": [{
                "id": 10,
                "name": "Home",
                "devices": [{ "id": 20, "name": "Security Panel" }]
            }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Full status reporting `arming_state` globally, with zones on
/// partitions 1 and 2.
async fn mount_full_status(server: &MockServer, arming_state: i32) {
    Mock::given(method("GET"))
        .and(path("/v1/locations/10/partitions/fullStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ArmingState": arming_state,
            "PanelStatus": {
                "Zones": [
                    { "PartitionID": 1, "ZoneID": 101 },
                    { "PartitionID": 1, "ZoneID": 102 },
                    { "PartitionID": 2, "ZoneID": 103 }
                ],
                "Partitions": []
            }
        })))
        .mount(server)
        .await;
}

const POLL_PATH: &str = "/v1/locations/10/devices/20/partitions/lastCommandState/-1";

async fn mount_poll_sequence(server: &MockServer, pending_ticks: u64, terminal_code: i32) {
    if pending_ticks > 0 {
        Mock::given(method("GET"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResultCode": 4500 })))
            .up_to_n_times(pending_ticks)
            .expect(pending_ticks)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ResultCode": terminal_code })),
        )
        .expect(1)
        .mount(server)
        .await;
}

// ── Topology & status tests ─────────────────────────────────────────

#[tokio::test]
async fn test_get_status_resolves_topology_then_reads_state() {
    let server = MockServer::start().await;
    let panel = rest_panel(&server, fast_poll());
    mount_token(&server).await;
    mount_locations(&server).await;
    mount_full_status(&server, 10201).await;

    let state = panel.get_status().await;

    assert_eq!(state, ArmingState::ArmedAway);
    let topology = panel.topology().await;
    assert_eq!(topology.location_id, 10);
    assert_eq!(topology.device_id, 20);
    assert_eq!(topology.partitions, vec![1, 2]);
}

#[tokio::test]
async fn test_resolve_location_is_memoized() {
    let server = MockServer::start().await;
    let panel = rest_panel(&server, fast_poll());
    mount_token(&server).await;
    mount_locations(&server).await; // expect(1) guards the second call
    mount_full_status(&server, 10200).await;

    assert_eq!(panel.resolve_location().await.unwrap(), 10);
    assert_eq!(panel.resolve_location().await.unwrap(), 10);
}

#[tokio::test]
async fn test_token_grant_failure_degrades_to_unknown() {
    let server = MockServer::start().await;
    let panel = rest_panel(&server, fast_poll());

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    assert_eq!(panel.get_status().await, ArmingState::Unknown);
}

#[tokio::test]
async fn test_empty_locations_reports_unknown_but_rejects_commands() {
    let server = MockServer::start().await;
    let panel = rest_panel(&server, fast_poll());
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/locations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "locationDetailResult": [] })),
        )
        .mount(&server)
        .await;

    assert_eq!(panel.get_status().await, ArmingState::Unknown);

    let result = panel.arm_system(ArmTarget::Away).await;
    assert!(
        matches!(result, Err(CoreError::NoLocation)),
        "expected NoLocation, got: {result:?}"
    );
}

// ── Command & polling tests ─────────────────────────────────────────

#[tokio::test]
async fn test_disarm_payload_and_polling_to_success() {
    let server = MockServer::start().await;
    let panel = rest_panel(&server, fast_poll());
    mount_token(&server).await;
    mount_locations(&server).await;
    mount_full_status(&server, 10201).await;

    Mock::given(method("PUT"))
        .and(path("/v2/locations/10/devices/20/partitions/disArm"))
        .and(body_json(json!({ "armType": -1, "partitions": [1, 2], "userCode": -1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResultCode": 4500 })))
        .expect(1)
        .mount(&server)
        .await;

    // [Initiated, Initiated, Success] resolves after exactly 3 polls;
    // the mock expectations enforce the count.
    mount_poll_sequence(&server, 2, 0).await;

    assert!(panel.arm_system(ArmTarget::Disarm).await.unwrap());
}

#[tokio::test]
async fn test_polling_resolves_false_on_terminal_failure() {
    let server = MockServer::start().await;
    let panel = rest_panel(&server, fast_poll());
    mount_token(&server).await;
    mount_locations(&server).await;
    mount_full_status(&server, 10200).await;

    Mock::given(method("PUT"))
        .and(path("/v2/locations/10/devices/20/partitions/arm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResultCode": 4500 })))
        .mount(&server)
        .await;

    // [Initiated, CommunicationFailure] resolves failure after 2 polls.
    mount_poll_sequence(&server, 1, -4108).await;

    assert!(!panel.arm_system(ArmTarget::Away).await.unwrap());
}

#[tokio::test]
async fn test_rejected_command_surfaces_classified_code() {
    let server = MockServer::start().await;
    let panel = rest_panel(&server, fast_poll());
    mount_token(&server).await;
    mount_locations(&server).await;
    mount_full_status(&server, 10200).await;

    Mock::given(method("PUT"))
        .and(path("/v2/locations/10/devices/20/partitions/arm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResultCode": -4106 })))
        .mount(&server)
        .await;

    let result = panel.arm_system(ArmTarget::Stay).await;

    match result {
        Err(CoreError::CommandRejected { code }) => {
            assert_eq!(code, ResultCode::InvalidUserCode);
        }
        other => panic!("expected CommandRejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_poll_bound_resolves_false() {
    let server = MockServer::start().await;
    let poll = PollSettings {
        initial_delay: Duration::from_millis(10),
        interval: Duration::from_millis(10),
        max_attempts: Some(3),
    };
    let panel = rest_panel(&server, poll);
    mount_token(&server).await;
    mount_locations(&server).await;
    mount_full_status(&server, 10200).await;

    Mock::given(method("PUT"))
        .and(path("/v2/locations/10/devices/20/partitions/arm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResultCode": 4500 })))
        .mount(&server)
        .await;

    // The panel never reaches a terminal state; the configured bound
    // gives up after exactly 3 polls.
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResultCode": 4500 })))
        .expect(3)
        .mount(&server)
        .await;

    assert!(!panel.arm_system(ArmTarget::Night).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_commands_share_one_poll_loop() {
    let server = MockServer::start().await;
    let poll = PollSettings {
        // Wide first tick so both commands are accepted before any poll.
        initial_delay: Duration::from_millis(100),
        interval: Duration::from_millis(10),
        max_attempts: Some(25),
    };
    let panel = rest_panel(&server, poll);
    mount_token(&server).await;
    mount_locations(&server).await;
    mount_full_status(&server, 10200).await;

    Mock::given(method("PUT"))
        .and(path("/v2/locations/10/devices/20/partitions/arm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResultCode": 4500 })))
        .expect(2)
        .mount(&server)
        .await;

    // A single poll chain: one pending tick, then one success. A second
    // timer chain would overrun the expect(1) on the terminal mock.
    mount_poll_sequence(&server, 1, 0).await;

    let (first, second) = tokio::join!(
        panel.arm_system(ArmTarget::Away),
        panel.arm_system(ArmTarget::Away)
    );

    assert!(first.unwrap());
    assert!(second.unwrap());
}

// ── Legacy generation tests ─────────────────────────────────────────

const SESSION_DETAILS: &str = r"<SessionDetailResults>
    <ResultCode>0</ResultCode>
    <Locations>
        <LocationInfoBasic>
            <LocationID>12</LocationID>
            <SecurityDeviceID>34</SecurityDeviceID>
        </LocationInfoBasic>
    </Locations>
</SessionDetailResults>";

fn legacy_status(arming_state: i32) -> String {
    format!(
        r"<PanelMetadataAndStatusResults>
            <ResultCode>0</ResultCode>
            <PanelMetadataAndStatus>
                <Partitions>
                    <PartitionInfo>
                        <PartitionID>1</PartitionID>
                        <ArmingState>{arming_state}</ArmingState>
                    </PartitionInfo>
                </Partitions>
            </PanelMetadataAndStatus>
        </PanelMetadataAndStatusResults>"
    )
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/xml")
}

#[tokio::test]
async fn test_legacy_status_reads_first_partition() {
    let server = MockServer::start().await;
    let panel = legacy_panel(&server, fast_poll());

    Mock::given(method("POST"))
        .and(path("/GetSessionDetails"))
        .respond_with(xml(SESSION_DETAILS.to_owned()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/GetPanelMetaDataAndFullStatusByDeviceID"))
        .and(body_string_contains("DeviceID=34"))
        .respond_with(xml(legacy_status(10203)))
        .mount(&server)
        .await;

    assert_eq!(panel.get_status().await, ArmingState::ArmedStay);
    let topology = panel.topology().await;
    assert_eq!(topology.location_id, 12);
    assert_eq!(topology.partitions, vec![1]);
}

#[tokio::test]
async fn test_legacy_disarm_polls_full_status_until_settled() {
    let server = MockServer::start().await;
    let panel = legacy_panel(&server, fast_poll());

    Mock::given(method("POST"))
        .and(path("/GetSessionDetails"))
        .respond_with(xml(SESSION_DETAILS.to_owned()))
        .mount(&server)
        .await;
    // The panel reports disarmed on the first completion poll.
    Mock::given(method("POST"))
        .and(path("/GetPanelMetaDataAndFullStatusByDeviceID"))
        .respond_with(xml(legacy_status(10200)))
        .mount(&server)
        .await;

    let accepted = r"<DisarmSecuritySystemResults>
        <ResultCode>4500</ResultCode>
    </DisarmSecuritySystemResults>";
    Mock::given(method("POST"))
        .and(path("/DisarmSecuritySystem"))
        .and(body_string_contains("LocationID=12"))
        .and(body_string_contains("UserCode=-1"))
        .respond_with(xml(accepted.to_owned()))
        .expect(1)
        .mount(&server)
        .await;

    assert!(panel.arm_system(ArmTarget::Disarm).await.unwrap());
}
