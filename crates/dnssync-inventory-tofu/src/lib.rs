// # OpenTofu Inventory Source
//
// Desired-state extractor over `tofu output -json`.
//
// ## Decode contract
//
// The provisioning output is double-encoded: the outer document maps output
// names to `{ "value": ... }` envelopes, and the value under
// `ansible_inventory_data` is itself a JSON-encoded *string* holding an
// Ansible-style inventory:
//
// ```json
// {
//   "ansible_inventory_data": {
//     "value": "{\"_meta\":{\"hostvars\":{\"node1\":{\"ansible_host\":\"10.0.0.5\",\"vm_name\":\"node1.lan\"}}}}"
//   }
// }
// ```
//
// The two decode stages are kept explicit rather than string surgery; each
// missing layer is a distinct, named extraction error so an empty desired
// set can never slip through as "delete everything".

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use dnssync_core::error::{Error, Result};
use dnssync_core::traits::InventorySource;
use dnssync_core::Record;

/// The output name carrying the inventory inside the tofu output document
pub const INVENTORY_OUTPUT_KEY: &str = "ansible_inventory_data";

/// Outer envelope: every tofu output is wrapped in `{ "value": ... }`
#[derive(Debug, Deserialize)]
struct OutputEnvelope {
    value: serde_json::Value,
}

/// Inner inventory document, after the second decode stage
#[derive(Debug, Deserialize)]
struct Inventory {
    #[serde(rename = "_meta")]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    // BTreeMap keeps host iteration stable across invocations.
    hostvars: Option<BTreeMap<String, HostVars>>,
}

/// Per-host attributes; `vm_name` is the display name registered in DNS,
/// falling back to the logical host name when absent
#[derive(Debug, Deserialize)]
struct HostVars {
    ansible_host: Option<String>,
    vm_name: Option<String>,
}

/// Where to obtain the outputs document
#[derive(Debug, Clone)]
enum OutputsOrigin {
    /// A cached `tofu output -json` file
    File(PathBuf),

    /// Run `tofu output -json` in this directory
    Command(PathBuf),
}

/// Inventory source reading OpenTofu outputs
///
/// Reads either a cached outputs file or the live `tofu output -json` of a
/// working directory, then applies the two-stage decode contract.
#[derive(Debug, Clone)]
pub struct TofuInventory {
    origin: OutputsOrigin,
}

impl TofuInventory {
    /// Read outputs from a cached JSON file
    pub fn from_outputs_file(path: impl AsRef<Path>) -> Self {
        Self {
            origin: OutputsOrigin::File(path.as_ref().to_path_buf()),
        }
    }

    /// Read outputs by invoking `tofu output -json` in a working directory
    pub fn from_tofu_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            origin: OutputsOrigin::Command(dir.as_ref().to_path_buf()),
        }
    }

    async fn raw_outputs(&self) -> Result<String> {
        match &self.origin {
            OutputsOrigin::File(path) => {
                debug!(path = %path.display(), "reading cached tofu outputs");
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    Error::extraction(format!(
                        "cannot read outputs file {}: {}",
                        path.display(),
                        e
                    ))
                })
            }
            OutputsOrigin::Command(dir) => {
                debug!(dir = %dir.display(), "running tofu output -json");
                let output = tokio::process::Command::new("tofu")
                    .args(["output", "-json"])
                    .current_dir(dir)
                    .output()
                    .await
                    .map_err(|e| Error::extraction(format!("cannot run tofu: {}", e)))?;
                if !output.status.success() {
                    return Err(Error::extraction(format!(
                        "tofu output failed: {}",
                        String::from_utf8_lossy(&output.stderr).trim()
                    )));
                }
                String::from_utf8(output.stdout)
                    .map_err(|e| Error::extraction(format!("tofu output is not UTF-8: {}", e)))
            }
        }
    }
}

/// Decode the outputs document into desired records
///
/// Exposed for testing; [`TofuInventory`] wires it to a file or subprocess.
pub fn parse_outputs(raw: &str) -> Result<Vec<Record>> {
    let outputs: BTreeMap<String, OutputEnvelope> = serde_json::from_str(raw)
        .map_err(|e| Error::extraction(format!("outputs document is not valid JSON: {}", e)))?;

    let envelope = outputs
        .get(INVENTORY_OUTPUT_KEY)
        .ok_or_else(|| {
            Error::extraction(format!(
                "output '{}' not found in tofu outputs",
                INVENTORY_OUTPUT_KEY
            ))
        })?;

    // Second decode stage: the envelope value is a JSON-encoded string.
    let inner = envelope.value.as_str().ok_or_else(|| {
        Error::extraction(format!(
            "output '{}' value is not a JSON-encoded string",
            INVENTORY_OUTPUT_KEY
        ))
    })?;
    let inventory: Inventory = serde_json::from_str(inner)
        .map_err(|e| Error::extraction(format!("inner inventory is not valid JSON: {}", e)))?;

    let hostvars = inventory
        .meta
        .and_then(|m| m.hostvars)
        .ok_or_else(|| Error::extraction("'_meta.hostvars' not found in inventory"))?;

    if hostvars.is_empty() {
        return Err(Error::extraction("no hosts found in _meta.hostvars"));
    }

    let mut records = Vec::with_capacity(hostvars.len());
    for (host, vars) in &hostvars {
        let address = match vars.ansible_host.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => {
                warn!(host = %host, "host entry has no ansible_host, skipping");
                continue;
            }
        };
        let domain = vars.vm_name.as_deref().filter(|n| !n.is_empty()).unwrap_or(host);
        match Record::new(domain, address) {
            Ok(record) => records.push(record),
            Err(e) => warn!(host = %host, error = %e, "skipping malformed host entry"),
        }
    }

    if records.is_empty() {
        return Err(Error::extraction(
            "every host entry was malformed, refusing an empty desired set",
        ));
    }

    Ok(records)
}

#[async_trait]
impl InventorySource for TofuInventory {
    async fn desired_records(&self) -> Result<Vec<Record>> {
        let raw = self.raw_outputs().await?;
        parse_outputs(&raw)
    }

    fn source_name(&self) -> &'static str {
        "tofu"
    }
}
