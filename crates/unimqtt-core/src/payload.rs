// ── Payload encoding and decoding ──
//
// Inbound payloads are JSON when they parse and plain strings otherwise;
// `{"val": x}` objects unwrap to `x`. Outbound status payloads are small
// JSON objects carrying `val` plus optional `mac` and `ts` (epoch ms).

use serde_json::{Map, Number, Value, json};

/// Decode an inbound payload into the value it carries.
pub fn decode(payload: &[u8]) -> Value {
    let text = String::from_utf8_lossy(payload);
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(mut map)) if map.contains_key("val") => {
            map.remove("val").unwrap_or(Value::Null)
        }
        Ok(value) => value,
        Err(_) => Value::String(text.into_owned()),
    }
}

/// Decode a retained client replay. Unlike commands these must be JSON.
pub fn decode_strict(payload: &[u8]) -> Result<Value, serde_json::Error> {
    let value: Value = serde_json::from_slice(payload)?;
    Ok(match value {
        Value::Object(mut map) => map.remove("val").unwrap_or(Value::Null),
        other => other,
    })
}

/// JSON truthiness: `null`, `false`, `0` and `""` are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => !is_zero(n),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn is_zero(n: &Number) -> bool {
    if let Some(u) = n.as_u64() {
        return u == 0;
    }
    if let Some(i) = n.as_i64() {
        return i == 0;
    }
    n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON)
}

// ── Outbound status objects ──────────────────────────────────────────

/// `{val}`
pub fn status(val: impl Into<Value>) -> Value {
    json!({ "val": val.into() })
}

/// `{val, ts}`
pub fn status_at(val: impl Into<Value>, ts: i64) -> Value {
    json!({ "val": val.into(), "ts": ts })
}

/// `{val, mac?, ts}` for a client presence topic.
pub fn client_status(present: bool, mac: Option<&str>, ts: i64) -> Value {
    let mut map = Map::new();
    map.insert("val".into(), Value::Bool(present));
    if let Some(mac) = mac {
        map.insert("mac".into(), Value::String(mac.to_owned()));
    }
    map.insert("ts".into(), Value::from(ts));
    Value::Object(map)
}

/// Render a payload the way it goes on the wire: bare strings and
/// booleans unquoted, everything else as JSON.
pub fn encode(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        other => other.to_string().into_bytes(),
    }
}

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
