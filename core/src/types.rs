//! Domain types for the remote `todos` table.
//!
//! # Design
//! `Task` mirrors one row as the store returns it. The insert and update
//! payloads are separate types so the only way to build an insert is through
//! `NewTask::from_input`, which enforces the trimmed, non-empty text rule.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Row key as the store reports it. Tables may key rows by uuid, text or an
/// integer identity column; the value is only ever echoed back in filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for TaskId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct TaskIdVisitor;

impl Visitor<'_> for TaskIdVisitor {
    type Value = TaskId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer row id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TaskId, E> {
        Ok(TaskId::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<TaskId, E> {
        Ok(TaskId(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TaskId, E> {
        Ok(TaskId(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TaskId, E> {
        Ok(TaskId(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TaskIdVisitor)
    }
}

/// One row of the `todos` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    /// Assigned by the store. Rows without a readable value sort after every
    /// dated row.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Accept `timestamptz` (RFC 3339) and offset-less `timestamp` columns, the
/// latter read as UTC. Anything else counts as missing.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Insert payload. `completed` is always `false` for a new row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    text: String,
    completed: bool,
}

impl NewTask {
    /// Trim `raw` and build an insert payload, or `None` if nothing is left.
    pub fn from_input(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            completed: false,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Update payload: the only column a row is ever patched on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionPatch {
    pub completed: bool,
}

/// Pending/done counters derived from a task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub pending: usize,
    pub done: usize,
}

impl Tally {
    pub fn of(tasks: &[Task]) -> Self {
        let done = tasks.iter().filter(|t| t.completed).count();
        Self {
            pending: tasks.len() - done,
            done,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.done
    }
}

/// Order tasks newest first. The sort is stable, so rows sharing a
/// timestamp keep the order the store sent them in.
pub fn sort_newest_first(tasks: &mut [Task]) {
    // `None < Some(_)`, so undated rows end up last.
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
