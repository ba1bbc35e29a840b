//! Response-shape handling for the Pi-hole API
//!
//! Pi-hole's success signal is not uniform across versions and endpoints.
//! Read responses come in several shapes, and mutation responses signal
//! success in several more. Both are modeled here as closed, ordered,
//! data-driven tables over already-parsed JSON: supporting another Pi-hole
//! version means adding one matcher, not another branch. Everything in this
//! module is pure and unit-testable without HTTP.

use serde_json::Value;
use tracing::{debug, warn};

use dnssync_core::error::{Error, Result};
use dnssync_core::Record;

/// One recognized read-response shape: a name plus its extractor
struct ReadShape {
    name: &'static str,
    extract: fn(&Value) -> Option<Vec<Record>>,
}

/// Recognized read shapes, tried in order, first match wins
const READ_SHAPES: &[ReadShape] = &[
    ReadShape {
        name: "bare record list",
        extract: |v| v.as_array().map(|list| records_from_objects(list)),
    },
    ReadShape {
        name: "object with data list",
        extract: |v| v.get("data")?.as_array().map(|list| records_from_objects(list)),
    },
    ReadShape {
        name: "object with customdns list",
        extract: |v| {
            v.get("customdns")?
                .as_array()
                .map(|list| records_from_objects(list))
        },
    },
    ReadShape {
        name: "nested config.dns.hosts lines",
        extract: |v| {
            let hosts = v.get("config")?.get("dns")?.get("hosts")?.as_array()?;
            Some(
                hosts
                    .iter()
                    .filter_map(|line| line.as_str())
                    .filter_map(|line| match Record::parse_host_line(line) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            warn!(error = %e, "skipping malformed hosts line");
                            None
                        }
                    })
                    .collect(),
            )
        },
    },
    ReadShape {
        name: "successful but empty",
        extract: |v| {
            let obj = v.as_object()?;
            if obj.contains_key("success") || obj.contains_key("took") {
                Some(Vec::new())
            } else {
                None
            }
        },
    },
];

/// Extract `{domain, ip}` objects, skipping entries missing either field
fn records_from_objects(list: &[Value]) -> Vec<Record> {
    list.iter()
        .filter_map(|entry| {
            let record = (|| {
                let domain = entry.get("domain")?.as_str()?;
                let ip = entry.get("ip")?.as_str()?;
                Record::new(domain, ip).ok()
            })();
            if record.is_none() {
                warn!(%entry, "skipping record entry without domain/ip");
            }
            record
        })
        .collect()
}

/// Interpret a read response under the recognized shapes
///
/// Returns `None` when no shape matches; the caller tries the next
/// candidate endpoint and warns if every candidate is exhausted.
pub fn interpret_read_response(value: &Value) -> Option<Vec<Record>> {
    for shape in READ_SHAPES {
        if let Some(records) = (shape.extract)(value) {
            debug!(shape = shape.name, count = records.len(), "read shape matched");
            return Some(records);
        }
    }
    None
}

/// Classify a mutation response body into success or a structured failure
///
/// The table is total over response bodies (transport failures are
/// classified before a body exists):
/// - empty body → success
/// - object with a truthy `success` flag → success
/// - object with an `error` field → failure with key/message/hint when present
/// - object with only a `took` telemetry field → success (observed add shape)
/// - the literal empty object `{}` → success
/// - JSON array or scalar → failure, unexpected shape
/// - non-JSON, non-empty text → failure, unparseable
///
/// Unknown object shapes are failures, never success-by-default.
pub fn classify_mutation_response(body: &str) -> Result<()> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return Err(Error::UnparseableResponse(snippet(trimmed))),
    };

    let object = match value.as_object() {
        Some(o) => o,
        None => return Err(Error::unexpected_shape(snippet(trimmed))),
    };

    if object.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }

    if let Some(error) = object.get("error") {
        return Err(api_error(error));
    }

    if object.contains_key("took") {
        return Ok(());
    }

    if object.is_empty() {
        return Ok(());
    }

    Err(Error::unexpected_shape(snippet(trimmed)))
}

/// Build a structured API error from Pi-hole's error payload
///
/// The payload is usually an object with `key`, `message` and `hint`; when
/// it is anything else the raw rendering becomes the message.
fn api_error(error: &Value) -> Error {
    match error.as_object() {
        Some(details) => Error::Api {
            key: details
                .get("key")
                .and_then(Value::as_str)
                .unwrap_or("N/A")
                .to_string(),
            message: details
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string(),
            hint: details
                .get("hint")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        None => Error::Api {
            key: "N/A".to_string(),
            message: error.to_string(),
            hint: None,
        },
    }
}

fn snippet(text: &str) -> String {
    const MAX: usize = 120;
    if text.len() <= MAX {
        return text.to_string();
    }
    let mut end = MAX;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(value: Value) -> Option<Vec<Record>> {
        interpret_read_response(&value)
    }

    #[test]
    fn bare_list_shape() {
        let records = read(json!([{"domain": "a.lan", "ip": "1.1.1.1"}])).unwrap();
        assert_eq!(records, vec![Record::new("a.lan", "1.1.1.1").unwrap()]);
    }

    #[test]
    fn data_list_shape() {
        let records = read(json!({"data": [{"domain": "a.lan", "ip": "1.1.1.1"}]})).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn customdns_list_shape() {
        let records = read(json!({"customdns": [{"domain": "a.lan", "ip": "1.1.1.1"}]})).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn nested_hosts_lines_shape() {
        let records = read(json!({
            "config": {"dns": {"hosts": ["10.10.10.187 pi.alert", "not-a-pair"]}}
        }))
        .unwrap();
        assert_eq!(records, vec![Record::new("pi.alert", "10.10.10.187").unwrap()]);
    }

    #[test]
    fn success_marker_without_payload_is_empty() {
        assert_eq!(read(json!({"took": 0.003})).unwrap(), vec![]);
        assert_eq!(read(json!({"success": true})).unwrap(), vec![]);
    }

    #[test]
    fn unknown_read_shape_matches_nothing() {
        assert!(read(json!({"unrelated": 42})).is_none());
        assert!(read(json!("just a string")).is_none());
    }

    #[test]
    fn list_entries_missing_fields_are_skipped() {
        let records = read(json!([
            {"domain": "a.lan", "ip": "1.1.1.1"},
            {"domain": "no-ip.lan"},
            {"ip": "2.2.2.2"}
        ]))
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    // The mutation classification table, shape by shape.

    #[test]
    fn empty_body_is_success() {
        assert!(classify_mutation_response("").is_ok());
        assert!(classify_mutation_response("   \n").is_ok());
    }

    #[test]
    fn truthy_success_flag_is_success() {
        assert!(classify_mutation_response(r#"{"success": true, "message": "ok"}"#).is_ok());
    }

    #[test]
    fn false_success_flag_is_not_success() {
        assert!(classify_mutation_response(r#"{"success": false}"#).is_err());
    }

    #[test]
    fn error_object_becomes_structured_failure() {
        let err = classify_mutation_response(
            r#"{"error": {"key": "bad_request", "message": "Invalid domain", "hint": "check it"}}"#,
        )
        .unwrap_err();
        match err {
            Error::Api { key, message, hint } => {
                assert_eq!(key, "bad_request");
                assert_eq!(message, "Invalid domain");
                assert_eq!(hint.as_deref(), Some("check it"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn non_object_error_field_uses_raw_message() {
        let err = classify_mutation_response(r#"{"error": "boom"}"#).unwrap_err();
        match err {
            Error::Api { message, .. } => assert!(message.contains("boom")),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn took_telemetry_alone_is_success() {
        assert!(classify_mutation_response(r#"{"took": 0.0042}"#).is_ok());
    }

    #[test]
    fn literal_empty_object_is_success() {
        assert!(classify_mutation_response("{}").is_ok());
    }

    #[test]
    fn array_and_scalar_are_unexpected_shapes() {
        assert!(matches!(
            classify_mutation_response("[1, 2]"),
            Err(Error::UnexpectedShape(_))
        ));
        assert!(matches!(
            classify_mutation_response("42"),
            Err(Error::UnexpectedShape(_))
        ));
        assert!(matches!(
            classify_mutation_response(r#""ok""#),
            Err(Error::UnexpectedShape(_))
        ));
    }

    #[test]
    fn non_json_text_is_unparseable() {
        assert!(matches!(
            classify_mutation_response("<html>guru meditation</html>"),
            Err(Error::UnparseableResponse(_))
        ));
    }

    #[test]
    fn unknown_object_shape_is_a_failure_not_success() {
        assert!(classify_mutation_response(r#"{"message": "mystery"}"#).is_err());
    }
}
