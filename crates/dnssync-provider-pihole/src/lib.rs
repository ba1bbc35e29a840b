// # Pi-hole DNS Backend
//
// Implements the `DnsBackend` trait against the Pi-hole v6 HTTP API.
//
// ## API surface
//
// - Auth: `POST /api/auth {"password": ...}` → session id + CSRF token
// - Read: candidate endpoints tried in order, responses normalized through
//   the shape matchers in [`shapes`]
// - Mutate: `PUT | DELETE /api/config/dns/hosts/<url-encoded "address domain">`
//   with the session cookie and CSRF header; body classified by the pure
//   table in [`shapes::classify_mutation_response`]
//
// ## Constraints
//
// - One HTTP call per mutation, no retry or backoff (a failed operation is
//   reported to the engine, which carries the batch on)
// - No caching of provider state
// - The session is owned by one run and never refreshed; an expired session
//   surfaces as whatever error the API returns for the failing call

pub mod session;
pub mod shapes;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use dnssync_core::error::{Error, Result};
use dnssync_core::traits::{DnsBackend, SessionCredential};
use dnssync_core::{Operation, Record};

pub use session::authenticate;

/// Read endpoints known across Pi-hole versions, tried in order
const READ_ENDPOINTS: &[&str] = &[
    "/api/config/dns/hosts",
    "/api/dns/customdns",
    "/admin/api.php?customdns",
    "/api/customdns",
];

/// Mutation resource; the record is addressed by its `"address domain"` pair
const HOSTS_RESOURCE: &str = "/api/config/dns/hosts";

/// Default per-call HTTP timeout
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Pi-hole backend holding one authenticated session
pub struct PiholeBackend {
    /// Base URL, scheme included, no trailing slash (e.g. "http://10.0.0.2")
    base_url: String,

    /// HTTP client with per-call timeout
    client: reqwest::Client,

    /// Session for this run
    credential: SessionCredential,
}

// The credential stays out of Debug output.
impl std::fmt::Debug for PiholeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiholeBackend")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .finish()
    }
}

impl PiholeBackend {
    /// Authenticate and build a backend over `base_url`
    ///
    /// Fails with `Error::Authentication` on any auth problem; the caller
    /// aborts the run rather than retrying.
    pub async fn connect(base_url: impl Into<String>, password: &str) -> Result<Self> {
        Self::connect_with_timeout(base_url, password, DEFAULT_HTTP_TIMEOUT).await
    }

    /// Authenticate with an explicit per-call timeout
    pub async fn connect_with_timeout(
        base_url: impl Into<String>,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("cannot build HTTP client: {}", e)))?;

        let credential = session::authenticate(&client, &base_url, password).await?;

        Ok(Self {
            base_url,
            client,
            credential,
        })
    }

    /// Base URL for a bare host, defaulting to plain HTTP as Pi-hole ships
    pub fn base_url_for_host(host: &str) -> String {
        format!("http://{}", host)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("X-CSRF-Token", &self.credential.csrf)
            .header("Cookie", format!("SID={}", self.credential.sid))
    }

    fn mutation_url(&self, record: &Record) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            HOSTS_RESOURCE,
            urlencoding::encode(&record.to_host_line())
        )
    }
}

#[async_trait]
impl DnsBackend for PiholeBackend {
    /// Read the custom host records, trying each known endpoint in order
    ///
    /// The first endpoint whose response matches a recognized shape wins.
    /// An endpoint that transports but matches no shape moves on to the
    /// next; if every endpoint responds unrecognizably the result is an
    /// empty list with a warning (provider records may be invisible to this
    /// run). Only when every endpoint fails at the transport level is an
    /// error returned, which the engine downgrades to a degraded read.
    async fn list_records(&self) -> Result<Vec<Record>> {
        let mut last_transport_error = None;
        let mut any_response = false;

        for endpoint in READ_ENDPOINTS {
            let url = format!("{}{}", self.base_url, endpoint);
            debug!(%url, "trying read endpoint");

            let response = match self.authed(self.client.get(&url)).send().await {
                Ok(r) => r,
                Err(e) => {
                    debug!(%url, error = %e, "read endpoint unreachable");
                    last_transport_error = Some(e);
                    continue;
                }
            };
            any_response = true;

            let text = match response.text().await {
                Ok(t) => t,
                Err(e) => {
                    debug!(%url, error = %e, "could not read response body");
                    continue;
                }
            };

            let value: serde_json::Value = match serde_json::from_str(text.trim()) {
                Ok(v) => v,
                Err(_) => {
                    debug!(%url, "response is not JSON, trying next endpoint");
                    continue;
                }
            };

            if let Some(records) = shapes::interpret_read_response(&value) {
                debug!(%url, count = records.len(), "records retrieved");
                return Ok(records);
            }
        }

        if any_response {
            warn!(
                "no read endpoint returned a recognized shape; \
                 provider-side records may be invisible to this run"
            );
            return Ok(Vec::new());
        }

        Err(Error::transport(format!(
            "all read endpoints unreachable: {}",
            last_transport_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no endpoints tried".to_string())
        )))
    }

    /// Apply one mutation: upsert via PUT, removal via DELETE
    async fn apply(&self, operation: &Operation) -> Result<()> {
        let record = operation.record();
        let url = self.mutation_url(record);
        let request = match operation {
            Operation::AddOrUpdate(_) => self.client.put(&url),
            Operation::Delete(_) => self.client.delete(&url),
        };

        debug!(%url, verb = operation.verb(), "sending mutation");

        let response = self
            .authed(request)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(format!("mutation call failed: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("could not read mutation response: {}", e)))?;

        shapes::classify_mutation_response(&body)
    }

    fn backend_name(&self) -> &'static str {
        "pihole"
    }
}
