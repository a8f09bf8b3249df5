//! Backend response parsing.
//!
//! Backends answer in free-form text that is expected to contain a JSON
//! array of issue objects. These functions pull that array out and turn
//! each valid entry into an [`Issue`]. They are pure domain logic — no I/O.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`extract_first_json_array`] | Locate the first well-formed JSON array in text |
//! | [`parse_issue_array`] | Extract + validate entries into issues |
//! | [`parse_issue_entry`] | Validate a single JSON object |

use super::entities::{Issue, IssueType, Severity};
use crate::core::backend::BackendId;
use serde_json::{Map, Value};

/// Keys accepted for the replacement text, in lookup order
const NEW_TEXT_KEYS: &[&str] = &["newCode", "new_code", "newText", "new_text", "fix"];

/// Keys accepted for the original text, in lookup order
const OLD_TEXT_KEYS: &[&str] = &["oldCode", "old_code", "oldText", "old_text"];

/// Find the first well-formed JSON array embedded in `text`.
///
/// Every `[` is tried as a starting point in order; the first one that
/// begins a complete JSON array wins. Surrounding prose, markdown fences
/// and wrapper objects such as `{"issues": [...]}` are ignored.
///
/// ```
/// use autofix_domain::review::parsing::extract_first_json_array;
///
/// let arr = extract_first_json_array("Here you go: [1, 2] and [3]").unwrap();
/// assert_eq!(arr.len(), 2);
/// assert!(extract_first_json_array("no json here").is_none());
/// ```
pub fn extract_first_json_array(text: &str) -> Option<Vec<Value>> {
    for (start, _) in text.match_indices('[') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Array(items))) = stream.next() {
            return Some(items);
        }
    }
    None
}

/// Parse a backend response into issues.
///
/// `default_file` is used for entries that omit `file` (the call contract
/// only guarantees `type`, `line` and `message`). Malformed entries are
/// dropped one by one; a response with no array yields an empty list.
pub fn parse_issue_array(response: &str, backend: &BackendId, default_file: &str) -> Vec<Issue> {
    let Some(items) = extract_first_json_array(response) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| item.as_object())
        .filter_map(|obj| parse_issue_entry(obj, backend, default_file))
        .collect()
}

/// Validate one issue object.
///
/// Required: a positive integer `line`, a recognised `type`, a non-empty
/// `message`, and a file (explicit or `default_file`). Unknown severities
/// fall back to `Medium`.
pub fn parse_issue_entry(
    obj: &Map<String, Value>,
    backend: &BackendId,
    default_file: &str,
) -> Option<Issue> {
    let file = match obj.get("file") {
        Some(Value::String(f)) if !f.trim().is_empty() => f.trim().to_string(),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            if default_file.is_empty() {
                return None;
            }
            default_file.to_string()
        }
        Some(_) => return None,
    };

    let line = parse_line(obj.get("line")?)?;

    let issue_type = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(|t| t.parse::<IssueType>().ok())?;

    let message = obj
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())?
        .to_string();

    let severity = obj
        .get("severity")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Severity>().ok())
        .unwrap_or_default();

    let mut issue = Issue::new(backend.clone(), file, line, issue_type, message).with_severity(severity);

    if let Some(new_text) = first_string(obj, NEW_TEXT_KEYS) {
        issue = issue.with_new_text(new_text);
    }
    if let Some(old_text) = first_string(obj, OLD_TEXT_KEYS) {
        issue = issue.with_old_text(old_text);
    }

    Some(issue)
}

fn parse_line(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    if raw == 0 {
        return None;
    }
    u32::try_from(raw).ok()
}

fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}
