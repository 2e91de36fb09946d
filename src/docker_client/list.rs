// Decode `GET /containers/json` into container descriptors.

use super::error::ParseError;
use crate::models::{ContainerDescriptor, UNKNOWN_NAME};
use serde_json::Value;

/// Maximum stored lengths in bytes; longer strings are truncated silently.
pub const MAX_ID_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_IMAGE_LEN: usize = 255;
pub const MAX_STATUS_LEN: usize = 32;

/// Decodes up to `max_count` descriptors, in array order. Elements missing a
/// required key or carrying the wrong kind of value are skipped.
pub fn decode_container_list(
    body: &str,
    max_count: usize,
) -> Result<Vec<ContainerDescriptor>, ParseError> {
    let root: Value = serde_json::from_str(body)?;
    let items = root.as_array().ok_or(ParseError::NotAnArray)?;
    let now = chrono::Utc::now().timestamp();

    let mut out = Vec::with_capacity(items.len().min(max_count));
    let mut consumed = 0;
    for item in items {
        if out.len() >= max_count {
            break;
        }
        consumed += 1;
        match decode_descriptor(item, now) {
            Some(d) => out.push(d),
            None => tracing::debug!(index = consumed - 1, "skipping malformed container entry"),
        }
    }
    if consumed < items.len() {
        tracing::warn!(
            max_count,
            dropped = items.len() - consumed,
            "container list exceeds capacity; extra entries dropped"
        );
    }
    Ok(out)
}

fn decode_descriptor(item: &Value, now: i64) -> Option<ContainerDescriptor> {
    let id = item.get("Id")?.as_str()?;
    let names = item.get("Names")?.as_array()?;
    let image = item.get("Image")?.as_str()?;
    let status = item.get("Status")?.as_str()?;
    let created = item.get("Created")?.as_i64()?;

    Some(ContainerDescriptor {
        id: truncate(id, MAX_ID_LEN),
        name: display_name(names),
        image: truncate(image, MAX_IMAGE_LEN),
        status: truncate(status, MAX_STATUS_LEN),
        created,
        last_seen: now,
    })
}

/// First name with one leading `/` stripped, or "unknown".
fn display_name(names: &[Value]) -> String {
    match names.first().and_then(Value::as_str) {
        Some(name) => {
            let name = name.strip_prefix('/').unwrap_or(name);
            truncate(name, MAX_NAME_LEN)
        }
        None => UNKNOWN_NAME.to_string(),
    }
}

/// Cuts `s` to at most `max` bytes without splitting a UTF-8 sequence.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
