//! Authentication session manager
//!
//! Exchanges the Pi-hole web password for a short-lived session: a session
//! id (sent back as the `SID` cookie) and an anti-forgery token (sent back
//! as the `X-CSRF-Token` header). A response is accepted only if the session
//! is explicitly marked valid AND both tokens are present; any other shape
//! is a hard authentication failure. No retry here: the credential comes
//! from a trusted secret store, so retrying would not fix a wrong secret —
//! the caller aborts the run instead.

use serde::Deserialize;
use tracing::{debug, info};

use dnssync_core::error::{Error, Result};
use dnssync_core::traits::SessionCredential;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    session: Option<Session>,
}

#[derive(Debug, Deserialize)]
struct Session {
    valid: Option<bool>,
    sid: Option<String>,
    csrf: Option<String>,
}

/// Authenticate against `POST {base_url}/api/auth`
pub async fn authenticate(
    client: &reqwest::Client,
    base_url: &str,
    password: &str,
) -> Result<SessionCredential> {
    let url = format!("{}/api/auth", base_url);
    debug!(%url, "authenticating");

    let response = client
        .post(&url)
        .json(&serde_json::json!({ "password": password }))
        .send()
        .await
        .map_err(|e| Error::auth(format!("auth request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::auth(format!("auth endpoint returned {}", status)));
    }

    let body: AuthResponse = response
        .json()
        .await
        .map_err(|e| Error::auth(format!("auth response is not valid JSON: {}", e)))?;

    let session = body
        .session
        .ok_or_else(|| Error::auth("auth response has no session object"))?;

    if session.valid != Some(true) {
        return Err(Error::auth("session not marked valid"));
    }

    match (session.sid, session.csrf) {
        (Some(sid), Some(csrf)) if !sid.is_empty() && !csrf.is_empty() => {
            info!("authentication successful, session established");
            Ok(SessionCredential { sid, csrf })
        }
        _ => Err(Error::auth(
            "session marked valid but sid or csrf token missing",
        )),
    }
}
