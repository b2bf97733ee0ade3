// Legacy generation HTTP client
//
// Form-POST requests, XML responses. The session identifier travels as a
// `SessionID` form field merged into every request alongside the fixed
// application identifiers. The expired-session retry contract mirrors the
// REST client's: a parsed body whose result code is the expiry sentinel
// triggers exactly one re-login and one retry; a second consecutive expiry
// is terminal.

use std::sync::RwLock;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::legacy::models::{
    CommandResults, LoginResults, PanelStatusResults, ResultEnvelope, SessionDetails,
};
use crate::state::{RESULT_SESSION_EXPIRED, ResultCode};
use crate::transport::TransportConfig;

/// Application identifiers fixed by the vendor for this API surface.
const APPLICATION_ID: &str = "14588";
const APPLICATION_VERSION: &str = "1.0.0";

/// Session-id sentinel sent before the first login.
const NO_SESSION: &str = "-1";

/// Async client for the legacy XML protocol.
///
/// Holds the current session id behind a lock; every request reads a
/// snapshot, and a re-login stores a wholly new id.
pub struct LegacyClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    session_id: RwLock<Option<String>>,
}

impl LegacyClient {
    /// Create a legacy client from a base URL and an account credential.
    ///
    /// No network traffic happens here; the session is established lazily
    /// when the server first reports the expiry sentinel (which it does
    /// for the pre-login `-1` session id).
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            session_id: RwLock::new(None),
        })
    }

    // ── Session management ───────────────────────────────────────────

    /// Log in and store a fresh session id.
    ///
    /// Success is recognized by result code 0; any other code, and any
    /// transport failure, surfaces as [`Error::Authentication`].
    pub async fn obtain_session(&self) -> Result<(), Error> {
        let url = self.endpoint_url("AuthenticateUserLogin");
        debug!("logging in at {url}");

        let form = [
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.expose_secret()),
            ("ApplicationID", APPLICATION_ID),
            ("ApplicationVersion", APPLICATION_VERSION),
        ];

        let resp = self.http.post(url).form(&form).send().await.map_err(|e| {
            error!(error = %e, "login endpoint unreachable");
            Error::Authentication {
                message: format!("login endpoint unreachable: {e}"),
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let login: LoginResults = decode(&body)?;

        if ResultCode::classify(login.result_code) != ResultCode::Success {
            return Err(Error::Authentication {
                message: format!(
                    "login rejected: {}",
                    ResultCode::classify(login.result_code)
                ),
            });
        }

        let session_id = login.session_id.ok_or_else(|| Error::Authentication {
            message: "login succeeded but no session id returned".into(),
        })?;

        debug!("using new session id");
        *self.session_id.write().expect("session lock poisoned") = Some(session_id);
        Ok(())
    }

    fn current_session(&self) -> String {
        self.session_id
            .read()
            .expect("session lock poisoned")
            .clone()
            .unwrap_or_else(|| NO_SESSION.to_owned())
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Build `{base}/{endpoint}` the way the service expects.
    fn endpoint_url(&self, endpoint: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{endpoint}")).expect("invalid endpoint URL")
    }

    async fn post_form(&self, endpoint: &str, fields: &[(&str, String)]) -> Result<String, Error> {
        let url = self.endpoint_url(endpoint);
        debug!("POST {url}");

        let mut form: Vec<(&str, String)> = Vec::with_capacity(fields.len() + 3);
        form.extend_from_slice(fields);
        form.push(("SessionID", self.current_session()));
        form.push(("ApplicationID", APPLICATION_ID.to_owned()));
        form.push(("ApplicationVersion", APPLICATION_VERSION.to_owned()));

        let resp = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        resp.text().await.map_err(Error::Transport)
    }

    /// POST a session-scoped request, transparently re-authenticating and
    /// retrying exactly once if the body carries the expiry sentinel.
    async fn call(&self, endpoint: &str, fields: &[(&str, String)]) -> Result<String, Error> {
        let body = self.post_form(endpoint, fields).await?;
        if !is_session_expired(&body) {
            return Ok(body);
        }

        debug!("session expired, re-authenticating");
        self.obtain_session().await?;

        let retry = self.post_form(endpoint, fields).await?;
        if is_session_expired(&retry) {
            return Err(Error::Authentication {
                message: "session still expired after re-authentication".into(),
            });
        }
        Ok(retry)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Fetch the account's locations and device ids (the legacy topology
    /// source).
    ///
    /// `POST GetSessionDetails`
    pub async fn session_details(&self) -> Result<SessionDetails, Error> {
        let body = self.call("GetSessionDetails", &[]).await?;
        decode(&body)
    }

    /// Fetch the full panel status for a device.
    ///
    /// `POST GetPanelMetaDataAndFullStatusByDeviceID`
    pub async fn full_status(&self, device_id: i64) -> Result<PanelStatusResults, Error> {
        let body = self
            .call(
                "GetPanelMetaDataAndFullStatusByDeviceID",
                &[
                    ("DeviceID", device_id.to_string()),
                    ("LastSequenceNumber", "0".to_owned()),
                    ("LastUpdatedTimestampTicks", "0".to_owned()),
                    ("PartitionID", "1".to_owned()),
                ],
            )
            .await?;
        decode(&body)
    }

    /// Issue an arm command.
    ///
    /// `POST ArmSecuritySystem`
    pub async fn arm(
        &self,
        device_id: i64,
        location_id: i64,
        arm_type: i32,
    ) -> Result<CommandResults, Error> {
        let body = self
            .call(
                "ArmSecuritySystem",
                &[
                    ("DeviceID", device_id.to_string()),
                    ("LocationID", location_id.to_string()),
                    ("UserCode", "-1".to_owned()),
                    ("ArmType", arm_type.to_string()),
                ],
            )
            .await?;
        decode(&body)
    }

    /// Issue a disarm command. Distinct endpoint; no arm-type field.
    ///
    /// `POST DisarmSecuritySystem`
    pub async fn disarm(&self, device_id: i64, location_id: i64) -> Result<CommandResults, Error> {
        let body = self
            .call(
                "DisarmSecuritySystem",
                &[
                    ("DeviceID", device_id.to_string()),
                    ("LocationID", location_id.to_string()),
                    ("UserCode", "-1".to_owned()),
                ],
            )
            .await?;
        decode(&body)
    }
}

/// Decode an XML body into a typed payload, keeping a body preview in the
/// error for debugging.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    quick_xml::de::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

/// True if a response body carries the expired-session result code.
///
/// Unparseable bodies are NOT treated as expiry — they fail later in the
/// endpoint's own decode step with a proper diagnostic.
fn is_session_expired(body: &str) -> bool {
    quick_xml::de::from_str::<ResultEnvelope>(body)
        .is_ok_and(|envelope| envelope.result_code == RESULT_SESSION_EXPIRED)
}

/// Clamp a body to a debuggable length.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
