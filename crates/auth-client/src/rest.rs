//! REST implementation of [`AuthService`] and [`PresenceDirectory`].
//!
//! `RestAuthClient` wraps a `reqwest::Client` and translates every trait
//! method into the corresponding HTTP call against the chat service.
//! Idempotent calls (presence listing, logout) are retried with exponential
//! back-off on transient (5xx / timeout / connect) failures; register and
//! login are attempted exactly once.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use pl_domain::config::ServiceConfig;
use pl_domain::error::{Error, Result};
use pl_domain::trace::TraceEvent;
use reqwest::{Client, RequestBuilder, Response};
use uuid::Uuid;

use crate::service::{AuthService, PresenceDirectory};
use crate::types::{Credentials, ErrorBody, LoginResponse, LogoutResponse, RegisterResponse};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST client for the chat service's account and presence endpoints.
///
/// Created once and reused for the lifetime of the client process.
/// The underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestAuthClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl RestAuthClient {
    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build a new client from the shared `ServiceConfig`.
    pub fn new(cfg: &ServiceConfig) -> Result<Self> {
        let timeout = cfg.timeout();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let base_url = cfg.base_url.trim_end_matches('/').to_owned();

        Ok(Self {
            http,
            base_url,
            timeout,
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard client headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        rb.header("X-Client-Type", "parley")
            .header("X-Trace-Id", &trace_id)
    }

    /// Build the full URL for a path like `/login/alice`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request, retrying up to `retries` extra times on
    /// transient errors.
    ///
    /// * Retries only errors for which [`Error::is_transient`] holds: 5xx
    ///   status codes, timeouts and connection failures.
    /// * Any other non-success status becomes [`Error::Service`] with the
    ///   service's `detail` message and is returned at once.
    /// * Emits a `TraceEvent::ServiceCall` after every attempt.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        retries: u32,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tracing::debug!(endpoint, attempt, backoff_ms = backoff.as_millis() as u64, "retrying");
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let rb = self.decorate(build_request());
            let result = rb.send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    TraceEvent::ServiceCall {
                        endpoint: endpoint.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    if resp.status().is_success() {
                        return Ok(resp);
                    }

                    let body = resp.text().await.unwrap_or_default();
                    let err = service_error(status, &body);
                    if !err.is_transient() {
                        return Err(err);
                    }
                    last_err = Some(err);
                }
                Err(e) => {
                    let status = e.status().map(|s| s.as_u16()).unwrap_or(0);

                    TraceEvent::ServiceCall {
                        endpoint: endpoint.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    let err = from_reqwest(e);
                    if !err.is_transient() {
                        return Err(err);
                    }
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Http(format!("{endpoint}: all retries exhausted"))))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl AuthService for RestAuthClient {
    async fn register(&self, identity: &str) -> Result<()> {
        let url = self.url(&format!("/register/{identity}"));
        let resp = self
            .execute_with_retry("POST /register", 0, || self.http.post(&url))
            .await
            .map_err(|e| match e {
                Error::Service { status, detail } if status < 500 => {
                    Error::Registration { reason: detail }
                }
                other => other,
            })?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let _: RegisterResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Protocol(format!("failed to parse register response: {e}: {body}"))
        })?;
        Ok(())
    }

    async fn login(&self, identity: &str) -> Result<Credentials> {
        let url = self.url(&format!("/login/{identity}"));
        let resp = self
            .execute_with_retry("POST /login", 0, || self.http.post(&url))
            .await
            .map_err(|e| match e {
                Error::Service { status, detail } if status < 500 => Error::Authentication(detail),
                other => other,
            })?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let parsed: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Protocol(format!("failed to parse login response: {e}: {body}"))
        })?;

        if parsed.token.is_empty() {
            return Err(Error::Authentication(
                "service returned an empty credential".into(),
            ));
        }
        Ok(Credentials::new(identity, parsed.token))
    }

    async fn logout(&self, credentials: &Credentials) -> Result<()> {
        let url = self.url(&format!("/logout/{}", credentials.identity()));
        let resp = self
            .execute_with_retry("POST /logout", self.max_retries, || {
                self.http.post(&url).bearer_auth(credentials.token())
            })
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let parsed: LogoutResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Protocol(format!("failed to parse logout response: {e}: {body}"))
        })?;
        tracing::debug!(username = %parsed.username, message = %parsed.message, "service acknowledged logout");
        Ok(())
    }
}

#[async_trait]
impl PresenceDirectory for RestAuthClient {
    async fn list_online(&self) -> Result<Vec<String>> {
        let url = self.url("/logged-in-users");
        let resp = self
            .execute_with_retry("GET /logged-in-users", self.max_retries, || {
                self.http.get(&url)
            })
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            Error::Protocol(format!("failed to parse online users: {e}: {body}"))
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Build an `Error::Service` from a non-success response, preferring the
/// service's `detail` message over the raw body.
fn service_error(status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message())
        .unwrap_or_else(|_| body.trim().to_owned());
    Error::Service { status, detail }
}
