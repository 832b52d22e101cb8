use crate::group::Group;
use crate::level::Level;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Ordered set of `key => value` tags attached to a log entry or scope.
///
/// Backed by `serde_json::Map` with the `preserve_order` feature, so
/// iteration (and therefore output field order) follows insertion order.
/// Inserting an existing key overwrites the value but keeps the key's
/// original position.
pub type Tags = serde_json::Map<String, Value>;

/// The finished field mapping for a single log record, in output order.
pub type Payload = serde_json::Map<String, Value>;

/// Build a [`Tags`] map from `key: value` pairs.
///
/// Values go through [`serde_json::json!`], so anything serializable
/// works:
///
/// ```
/// use klogger::tags;
///
/// let t = tags! { user: "adam", attempts: 3 };
/// assert_eq!(t["attempts"], 3);
/// ```
#[macro_export]
macro_rules! tags {
    () => { $crate::payload::Tags::new() };
    ($($key:ident : $value:expr),+ $(,)?) => {{
        let mut map = $crate::payload::Tags::new();
        $(
            map.insert(stringify!($key).to_string(), $crate::serde_json::json!($value));
        )+
        map
    }};
}

/// Timestamp format used for the `time` payload field and by the
/// line-oriented formatter.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Merge one log call's context into a payload, returning it together
/// with the trail of non-anonymous group ids (global stack first, then
/// instance stack, oldest pushed first).
///
/// Precedence on key collision: later sources win, but a key keeps the
/// position it was first inserted at. Source order is `time`/`severity`,
/// logger name, instance tags, message, call-site tags, global-group
/// tags, instance-group tags. Null-valued keys (and an empty message)
/// are dropped before the optional `groups` field is appended.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_payload(
    level: Level,
    time: DateTime<Utc>,
    name: Option<&str>,
    instance_tags: &Tags,
    message: Option<String>,
    call_tags: Tags,
    global_groups: &[Group],
    instance_groups: &[Group],
    include_group_ids: bool,
) -> (Payload, Vec<String>) {
    let mut payload = Payload::new();
    payload.insert(
        "time".to_string(),
        Value::String(time.format(TIME_FORMAT).to_string()),
    );
    payload.insert(
        "severity".to_string(),
        Value::String(level.as_str().to_string()),
    );
    if let Some(name) = name {
        payload.insert("logger".to_string(), Value::String(name.to_string()));
    }
    for (key, value) in instance_tags {
        payload.insert(key.clone(), value.clone());
    }
    if let Some(message) = message {
        if !message.is_empty() {
            payload.insert("message".to_string(), Value::String(message));
        }
    }
    for (key, value) in call_tags {
        payload.insert(key, value);
    }

    let mut group_ids = Vec::new();
    for group in global_groups.iter().chain(instance_groups) {
        for (key, value) in &group.tags {
            payload.insert(key.clone(), value.clone());
        }
        if let Some(id) = &group.id {
            group_ids.push(id.clone());
        }
    }

    payload.retain(|_, value| !value.is_null());

    if include_group_ids && !group_ids.is_empty() {
        payload.insert("groups".to_string(), Value::String(group_ids.join(",")));
    }

    (payload, group_ids)
}
