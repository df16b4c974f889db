//! HTTP client for the gatepass authority.
//!
//! The client is a thin transport: one request per operation, no retry and
//! no caching. Decisions stay with the authority; this module only maps
//! HTTP outcomes onto [`AuthorityError`].
//!
//! # Status Mapping
//!
//! | Reply | Result |
//! |-------|--------|
//! | 2xx | decoded body, or `InvalidResponse` if it does not decode |
//! | 4xx | `Rejected { status, detail }` |
//! | 5xx | `Unavailable` |
//! | no reply (connect, timeout) | `Unavailable` |
//!
//! `detail` comes from the `detail`, `error` or `message` field of a JSON
//! error body, falling back to the raw body text.

use crate::config::AuthorityConfig;
use chrono::NaiveDateTime;
use gatepass_attendance::{AttendanceEvent, AttendanceSource, DateRange};
use gatepass_checkpoint::authority::{
    AttendanceScanReply, AuthorityClient, AuthorityError, AuthorityResult, CheckInReply,
    CheckOutReply, RosterEntry, VerifyReply,
};
use gatepass_core::{Credential, Direction};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, trace, warn};

const VERIFY_PATH: &str = "/scan/verify";
const CHECK_IN_PATH: &str = "/visitor/checkin";
const CHECK_OUT_PATH: &str = "/visitor/checkout";
const ATTENDANCE_PATH: &str = "/attendance/scan";
const ROSTER_PATH: &str = "/site/employees/signed-in";

/// Timestamp layouts accepted in attendance logs.
const LOG_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Raw HTTP outcome before decoding.
struct Exchange {
    status: StatusCode,
    body: String,
}

#[derive(Deserialize)]
struct RosterBody {
    #[serde(default)]
    employees: Vec<RosterEntry>,
}

#[derive(Deserialize)]
struct LogsBody {
    #[serde(default)]
    logs: Vec<LogRow>,
}

#[derive(Deserialize)]
struct LogRow {
    scan_status: Direction,
    timestamp: String,
}

/// Authority reached over JSON/HTTP.
///
/// # Example
///
/// ```no_run
/// use gatepass_checkpoint::AuthorityClient;
/// use gatepass_core::Credential;
/// use gatepass_network::{AuthorityConfig, HttpAuthority};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let authority = HttpAuthority::new(AuthorityConfig::new("http://127.0.0.1:8000"))?;
/// let reply = authority.verify(&Credential::new("EMP_3_2d0b007bad15")?).await?;
/// println!("{:?}", reply.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    http: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpAuthority {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if the base URL is empty or the HTTP client
    /// cannot be constructed.
    pub fn new(config: AuthorityConfig) -> gatepass_core::Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(gatepass_core::Error::Config(
                "authority base URL is empty".to_string(),
            ));
        }

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| gatepass_core::Error::Config(format!("HTTP client: {e}")))?;

        debug!(%base_url, timeout_ms = config.timeout.as_millis() as u64, "Created authority client");

        Ok(Self {
            http,
            base_url,
            token: config.token,
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_credential(&self, path: &str, credential: &Credential) -> AuthorityResult<Exchange> {
        trace!(path, "Posting credential");
        let request = self
            .http
            .post(self.url(path))
            .json(&json!({ "qr_code": credential.as_str() }));
        self.exchange(request).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> AuthorityResult<Exchange> {
        trace!(path, "Fetching");
        let request = self.http.get(self.url(path)).query(query);
        self.exchange(request).await
    }

    async fn exchange(&self, request: RequestBuilder) -> AuthorityResult<Exchange> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Authority request timed out");
                AuthorityError::unavailable(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                ))
            } else {
                warn!(error = %e, "Authority request failed");
                AuthorityError::unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthorityError::unavailable(format!("reading reply: {e}")))?;

        trace!(status = status.as_u16(), bytes = body.len(), "Authority replied");
        Ok(Exchange { status, body })
    }
}

impl Exchange {
    /// Decode a 2xx body, or classify the failure.
    fn decode<T: DeserializeOwned>(self) -> AuthorityResult<T> {
        if self.status.is_success() {
            return serde_json::from_str(&self.body)
                .map_err(|e| AuthorityError::invalid_response(e.to_string()));
        }
        Err(self.into_error())
    }

    fn into_error(self) -> AuthorityError {
        let detail = error_detail(&self.body).unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

        if self.status.is_server_error() {
            AuthorityError::unavailable(format!("{}: {detail}", self.status.as_u16()))
        } else {
            AuthorityError::rejected(Some(self.status.as_u16()), detail)
        }
    }
}

/// Human-readable reason from an error body.
fn error_detail(body: &str) -> Option<String> {
    let text = body.trim();
    if text.is_empty() {
        return None;
    }

    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(text) else {
        return Some(text.to_string());
    };

    ["detail", "error", "message"]
        .iter()
        .find_map(|key| match fields.get(*key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .or_else(|| Some(text.to_string()))
}

fn parse_log_timestamp(raw: &str) -> Option<NaiveDateTime> {
    LOG_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
}

impl AuthorityClient for HttpAuthority {
    async fn verify(&self, credential: &Credential) -> AuthorityResult<VerifyReply> {
        self.post_credential(VERIFY_PATH, credential).await?.decode()
    }

    async fn check_in(&self, credential: &Credential) -> AuthorityResult<CheckInReply> {
        let exchange = self.post_credential(CHECK_IN_PATH, credential).await?;

        // A refused check-in may still carry the flag list
        if exchange.status.is_client_error()
            && let Ok(reply) = serde_json::from_str::<CheckInReply>(&exchange.body)
            && (reply.has_flags() || reply.alert == Some(true))
        {
            debug!(status = exchange.status.as_u16(), "Check-in refused with flags");
            return Ok(CheckInReply {
                success: Some(false),
                ..reply
            });
        }
        exchange.decode()
    }

    async fn check_out(&self, credential: &Credential) -> AuthorityResult<CheckOutReply> {
        self.post_credential(CHECK_OUT_PATH, credential).await?.decode()
    }

    async fn scan_attendance(&self, credential: &Credential) -> AuthorityResult<AttendanceScanReply> {
        self.post_credential(ATTENDANCE_PATH, credential).await?.decode()
    }

    async fn signed_in_roster(&self) -> AuthorityResult<Vec<RosterEntry>> {
        let body: RosterBody = self.get(ROSTER_PATH, &[]).await?.decode()?;
        Ok(body.employees)
    }
}

impl AttendanceSource for HttpAuthority {
    async fn attendance_events(
        &self,
        employee_id: u64,
        range: &DateRange,
    ) -> gatepass_core::Result<Vec<AttendanceEvent>> {
        let path = format!("/site/employees/{employee_id}/attendance");
        let query = [
            ("start_date", range.start().to_string()),
            ("end_date", range.end().to_string()),
        ];

        let body: LogsBody = self.get(&path, &query).await?.decode()?;

        body.logs
            .into_iter()
            .map(|row| {
                parse_log_timestamp(&row.timestamp)
                    .map(|timestamp| AttendanceEvent::new(timestamp, row.scan_status))
                    .ok_or_else(|| {
                        gatepass_core::Error::InvalidResponse(format!(
                            "bad log timestamp: {}",
                            row.timestamp
                        ))
                    })
            })
            .collect()
    }
}
