//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `now_rfc3339`.
//! Role: Shared contract for CLI diagnostics such as ABSENT results and skipped records.
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value, json};
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub input: String,
    pub message: String,
    pub details: Map<String, Value>,
}

impl Notice {
    /// A record whose projection produced nothing.
    pub fn absent(cmd: &str, input: &str, record: u64, template: &str) -> Self {
        let mut details = Map::new();
        details.insert("record".to_string(), json!(record));
        details.insert("template".to_string(), json!(template));
        Self {
            kind: "absent".to_string(),
            time: now_rfc3339().unwrap_or_default(),
            cmd: cmd.to_string(),
            input: input.to_string(),
            message: format!("record {record} produced no output"),
            details,
        }
    }

    /// A record dropped under the `skip` error policy.
    pub fn skipped(cmd: &str, input: &str, line: Option<u64>, reason: &str) -> Self {
        let mut details = Map::new();
        if let Some(line) = line {
            details.insert("line".to_string(), json!(line));
        }
        details.insert("reason".to_string(), json!(reason));
        let message = match line {
            Some(line) => format!("skipped line {line}: {reason}"),
            None => format!("skipped record: {reason}"),
        };
        Self {
            kind: "skip".to_string(),
            time: now_rfc3339().unwrap_or_default(),
            cmd: cmd.to_string(),
            input: input.to_string(),
            message,
            details,
        }
    }
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("input".to_string(), json!(notice.input));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

pub fn now_rfc3339() -> Option<String> {
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}
