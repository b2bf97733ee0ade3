// REST generation HTTP client
//
// Wraps `reqwest::Client` with bearer-token injection and the
// expired-token retry contract: a 401 on any call triggers exactly one
// token refresh and exactly one retry of the original request. A second
// consecutive 401 is terminal. All other responses pass through for
// per-endpoint classification.

use std::sync::RwLock;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::auth::{BearerToken, Credentials};
use crate::error::Error;
use crate::rest::models::{ArmRequest, CommandState, FullStatus, LocationsResult, TokenResponse};
use crate::transport::TransportConfig;

/// OAuth client identifier fixed by the vendor for this API surface.
const CLIENT_ID: &str = "c7f230ff686b4cc284b6c78a40aa255d";

/// The production token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://rs.alarmnet.com/TC2API.Auth/token";

/// Async client for the newer JSON protocol.
///
/// Holds the current bearer token behind a lock; every request reads an
/// immutable snapshot, and a refresh stores a wholly new token rather than
/// mutating shared request defaults in place.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token_url: Url,
    credentials: Credentials,
    token: RwLock<Option<BearerToken>>,
}

impl RestClient {
    /// Create a REST client from base/token URLs and an account credential.
    ///
    /// No network traffic happens here; the token is obtained lazily on
    /// the first authenticated call.
    pub fn new(
        base_url: Url,
        token_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token_url,
            credentials,
            token: RwLock::new(None),
        })
    }

    // ── Token management ─────────────────────────────────────────────

    /// Obtain a fresh access token via the resource-owner-password grant
    /// and store it for subsequent requests.
    ///
    /// Network errors and non-2xx grants both surface as
    /// [`Error::Authentication`] so callers can degrade uniformly.
    pub async fn obtain_token(&self) -> Result<BearerToken, Error> {
        debug!("requesting access token at {}", self.token_url);

        let form = [
            ("grant_type", "password"),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.expose_secret()),
            ("client_id", CLIENT_ID),
        ];

        let resp = self
            .http
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "token endpoint unreachable");
                Error::Authentication {
                    message: format!("token endpoint unreachable: {e}"),
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(%status, "token grant rejected");
            return Err(Error::Authentication {
                message: format!("token grant failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let grant: TokenResponse = resp.json().await.map_err(|e| Error::Authentication {
            message: format!("malformed token response: {e}"),
        })?;

        let token = BearerToken {
            token_type: grant.token_type,
            access_token: grant.access_token,
        };
        *self.token.write().expect("token lock poisoned") = Some(token.clone());
        debug!("access token refreshed");
        Ok(token)
    }

    fn current_token(&self) -> Option<BearerToken> {
        self.token.read().expect("token lock poisoned").clone()
    }

    /// The `Authorization` header value, obtaining a token first if none
    /// is held yet.
    async fn bearer(&self) -> Result<String, Error> {
        if let Some(token) = self.current_token() {
            return Ok(token.header_value());
        }
        Ok(self.obtain_token().await?.header_value())
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Join a relative path (e.g. `"v1/locations"`) onto the base URL.
    fn api_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{path}")).expect("invalid API URL")
    }

    async fn dispatch<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        params: Option<&[(&str, String)]>,
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error> {
        let mut builder = self
            .http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?);
        if let Some(params) = params {
            builder = builder.query(params);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await.map_err(Error::Transport)
    }

    /// Send a request with bearer auth, refreshing the token and retrying
    /// exactly once on 401.
    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        params: Option<&[(&str, String)]>,
        body: Option<&B>,
    ) -> Result<T, Error> {
        let url = self.api_url(path);
        debug!("{method} {url}");

        let resp = self.dispatch(method.clone(), url.clone(), params, body).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Self::handle_response(resp).await;
        }

        debug!("access token rejected (HTTP 401), refreshing");
        self.obtain_token().await?;

        let retry = self.dispatch(method, url, params, body).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "request still unauthorized after token refresh".into(),
            });
        }
        Self::handle_response(retry).await
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::GET, path, None, None::<&()>).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        self.request(Method::GET, path, Some(params), None::<&()>)
            .await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.request(Method::PUT, path, None, Some(body)).await
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// List the account's locations and their devices.
    ///
    /// `GET v1/locations`
    pub async fn list_locations(&self) -> Result<LocationsResult, Error> {
        self.get("v1/locations").await
    }

    /// Fetch the full panel status for a location.
    ///
    /// `GET v1/locations/{loc}/partitions/fullStatus`
    pub async fn full_status(&self, location_id: i64) -> Result<FullStatus, Error> {
        self.get(&format!("v1/locations/{location_id}/partitions/fullStatus"))
            .await
    }

    /// Issue an arm command.
    ///
    /// `PUT v2/locations/{loc}/devices/{dev}/partitions/arm`
    pub async fn arm(
        &self,
        location_id: i64,
        device_id: i64,
        arm_type: i32,
        partitions: &[i64],
    ) -> Result<CommandState, Error> {
        self.put(
            &format!("v2/locations/{location_id}/devices/{device_id}/partitions/arm"),
            &ArmRequest {
                arm_type,
                partitions: partitions.to_vec(),
                user_code: -1,
            },
        )
        .await
    }

    /// Issue a disarm command. Distinct endpoint from arm; the body still
    /// carries the disarm arm-type code.
    ///
    /// `PUT v2/locations/{loc}/devices/{dev}/partitions/disArm`
    pub async fn disarm(
        &self,
        location_id: i64,
        device_id: i64,
        arm_type: i32,
        partitions: &[i64],
    ) -> Result<CommandState, Error> {
        self.put(
            &format!("v2/locations/{location_id}/devices/{device_id}/partitions/disArm"),
            &ArmRequest {
                arm_type,
                partitions: partitions.to_vec(),
                user_code: -1,
            },
        )
        .await
    }

    /// Query the completion state of the last arm/disarm command.
    ///
    /// `GET v1/locations/{loc}/devices/{dev}/partitions/lastCommandState/-1`
    pub async fn last_command_state(
        &self,
        location_id: i64,
        device_id: i64,
        partitions: &[i64],
    ) -> Result<CommandState, Error> {
        let ids = partitions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.get_with_params(
            &format!(
                "v1/locations/{location_id}/devices/{device_id}/partitions/lastCommandState/-1"
            ),
            &[("PartitionIds", ids)],
        )
        .await
    }
}

/// Clamp a body to a debuggable length.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
