use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;
use crate::IdStrategy;

/// One chat entry as stored on disk and returned by the API.
///
/// `user` and `text` are whatever the caller sent. An explicit `null` is kept
/// as `Some(Value::Null)`; a missing field stays `None` and is omitted again
/// on output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: u64,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    pub timestamp: String,
}

/// The whole persisted document: `{ "messages": [...] }`, plus the id counter
/// when the counter strategy is in use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
}

/// Caller-supplied fields for a new message. Nothing is validated.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NewMessage {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
}

fn present<'de, D>(d: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(d).map(Some)
}

impl NewMessage {
    pub fn new(user: impl Into<Value>, text: impl Into<Value>) -> Self {
        Self { user: Some(user.into()), text: Some(text.into()) }
    }

    /// Pick `user` and `text` out of an arbitrary JSON payload. Anything that
    /// is not an object simply yields no fields.
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::Object(mut map) => Self { user: map.remove("user"), text: map.remove("text") },
            _ => Self::default(),
        }
    }
}

impl Collection {
    /// Hand out the id for the next inserted message.
    ///
    /// `Length` drops any stored counter so the file keeps the plain layout.
    /// `Counter` never goes below the ids already present, so a counter left
    /// behind by an earlier run cannot hand out a live id.
    pub fn allocate_id(&mut self, strategy: IdStrategy) -> Result<u64, ServiceError> {
        match strategy {
            IdStrategy::Length => {
                self.next_id = None;
                Ok(self.messages.len() as u64 + 1)
            }
            IdStrategy::Counter => {
                let id = self.next_id.unwrap_or(0).max(self.seed_counter()?);
                self.next_id = Some(id.checked_add(1).ok_or(ServiceError::IdsExhausted)?);
                Ok(id)
            }
        }
    }

    fn seed_counter(&self) -> Result<u64, ServiceError> {
        let max_id = self.messages.iter().map(|m| m.id).max().unwrap_or(0);
        max_id
            .max(self.messages.len() as u64)
            .checked_add(1)
            .ok_or(ServiceError::IdsExhausted)
    }

    /// Remove every message carrying `id` and report how many went away.
    pub fn remove_by_id(&mut self, id: i64) -> usize {
        let Ok(id) = u64::try_from(id) else { return 0 };
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        before - self.messages.len()
    }
}

/// Current time in the `2024-05-01T12:00:00.000Z` form.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Read a message id from a path segment using integer-prefix rules: skip
/// leading whitespace, accept one sign, then take the leading base-10 digits.
/// `"12abc"` is 12, `"abc"` is `None`.
pub fn parse_message_id(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}
