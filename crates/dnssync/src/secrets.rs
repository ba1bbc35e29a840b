//! SOPS-encrypted secret loading
//!
//! The Pi-hole credential lives in a SOPS-encrypted YAML file; decryption is
//! delegated to the external `sops` binary so ciphertext never crosses into
//! this process's parsing code. The decrypted document carries the Pi-hole
//! block either at the root or under `default`:
//!
//! ```yaml
//! pihole:
//!   ip_address: 10.0.0.2
//!   web_password: secret
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Credentials for one Pi-hole instance
#[derive(Clone, Deserialize)]
pub struct PiholeSecrets {
    /// Provider host (IP or name, no scheme)
    pub ip_address: String,

    /// Web interface password exchanged for a session
    pub web_password: String,
}

// The password stays out of Debug output.
impl std::fmt::Debug for PiholeSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiholeSecrets")
            .field("ip_address", &self.ip_address)
            .field("web_password", &"<REDACTED>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SecretsDocument {
    pihole: Option<PiholeSecrets>,
    default: Option<DefaultBlock>,
}

#[derive(Debug, Deserialize)]
struct DefaultBlock {
    pihole: Option<PiholeSecrets>,
}

/// Resolve the secrets file path: explicit flag, else the conventional
/// location next to the tofu directory
pub fn resolve_secrets_path(explicit: Option<&Path>, tf_dir: &Path) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => tf_dir.join("..").join("terraform").join("secrets.sops.yaml"),
    }
}

/// Decrypt the secrets file via `sops -d` and extract the Pi-hole block
pub async fn load_pihole_secrets(path: &Path) -> Result<PiholeSecrets> {
    if !path.exists() {
        bail!("secrets file not found at {}", path.display());
    }

    debug!(path = %path.display(), "decrypting secrets via sops");
    let output = tokio::process::Command::new("sops")
        .arg("-d")
        .arg(path)
        .output()
        .await
        .context("cannot run 'sops'; ensure it is installed and in PATH")?;

    if !output.status.success() {
        bail!(
            "sops decryption failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    parse_secrets(&String::from_utf8_lossy(&output.stdout))
}

fn parse_secrets(yaml: &str) -> Result<PiholeSecrets> {
    let document: SecretsDocument =
        serde_yaml::from_str(yaml).context("decrypted secrets are not valid YAML")?;

    let pihole = document
        .pihole
        .or(document.default.and_then(|d| d.pihole))
        .context("'pihole' block not found in secrets, neither at the root nor under 'default'")?;

    if pihole.ip_address.is_empty() || pihole.web_password.is_empty() {
        bail!("'pihole' block is missing ip_address or web_password");
    }

    Ok(pihole)
}
