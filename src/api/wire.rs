//! Tolerant decoding of the backend's task payloads.
//!
//! Two backend revisions serialize tasks differently: the SQL one
//! returns plain strings everywhere, the document-store one leaks
//! extended JSON (`{"$oid": ...}` ids, `{"$date": ...}` dates) and a
//! comma-separated `shared_with` string. Everything here folds both
//! shapes into the one canonical `core::task::Task`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::core::identity;
use crate::core::task::{Priority, Task, TaskStatus};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// A task exactly as the backend sent it, fields left raw where the
/// wire shape varies.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    #[serde(rename = "_id", alias = "id")]
    pub id: Value,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub reminder: Option<Value>,
    #[serde(default)]
    pub shared_with: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
}

impl RawTask {
    /// Fold the raw payload into the canonical model. Identity goes
    /// through the resolver; labels through the translation table;
    /// unknown status labels degrade to Pending with a warning.
    pub fn into_task(self) -> Task {
        let identity = identity::resolve(&self.id);

        let status = match self.status.as_deref() {
            None | Some("") => TaskStatus::Pending,
            Some(label) => TaskStatus::from_label(label).unwrap_or_else(|| {
                log::warn!("Unknown status label {:?} on task {}", label, identity);
                TaskStatus::Pending
            }),
        };

        let priority = self
            .priority
            .as_deref()
            .and_then(Priority::from_label)
            .unwrap_or_default();

        let description = self.description.filter(|d| !d.is_empty());
        let due_date = self.due_date.as_ref().and_then(parse_wire_date);
        let reminder = self.reminder.as_ref().and_then(parse_wire_datetime);
        let created = self.created_at.as_ref().and_then(parse_wire_datetime);
        let shared_with = self
            .shared_with
            .as_ref()
            .map(parse_shared_with)
            .unwrap_or_default();

        Task {
            identity,
            title: self.title,
            description,
            due_date,
            status,
            priority,
            reminder,
            shared_with,
            created,
        }
    }
}

/// Parse a due date in any shape the backend has been seen to emit:
/// `"YYYY-MM-DD"`, an RFC 3339 timestamp, or an extended-JSON
/// `{"$date": <iso string | epoch millis>}` wrapper.
pub fn parse_wire_date(value: &Value) -> Option<NaiveDate> {
    parse_wire_datetime(value).map(|dt| dt.date())
}

/// Same tolerance for date-times. Seconds are optional because the
/// reminder endpoint accepts `YYYY-MM-DD HH:MM`.
pub fn parse_wire_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_datetime_str(s),
        Value::Object(map) => match map.get("$date") {
            Some(Value::String(s)) => parse_datetime_str(s),
            Some(Value::Number(n)) => {
                let millis = n.as_i64()?;
                DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
            }
            _ => None,
        },
        Value::Number(n) => {
            DateTime::from_timestamp_millis(n.as_i64()?).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Recipients arrive either as a JSON array or as the legacy
/// comma-separated string. Deduplicates while keeping first-seen order.
pub fn parse_shared_with(value: &Value) -> Vec<String> {
    let items: Vec<String> = match value {
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        Value::Array(arr) => arr
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

/// Whether a share recipient looks like an email address. Checked
/// client-side before the share call; the backend accepts anything.
pub fn is_valid_recipient(addr: &str) -> bool {
    EMAIL_RE.is_match(addr)
}

/// Pull the human-readable message out of a structured error body
/// (`{"error": ...}`, `{"message": ...}` or `{"msg": ...}`, depending
/// on the endpoint).
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for key in ["error", "message", "msg"] {
        if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
            return Some(msg.to_string());
        }
    }
    None
}
