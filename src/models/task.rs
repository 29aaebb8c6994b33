use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Timestamp format used everywhere a task crosses a file boundary.
/// Minute precision; seconds are never persisted.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn context_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@[\w\-]+").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\+[\w\-]+").unwrap())
}

/// A unit of tracked work: a free-text description plus a start time and,
/// once completed, a stop time.
///
/// Two tasks are the same logical task iff their descriptions are equal;
/// identity is a digest of the description so repeated runs of the same
/// activity on different days group together in reports.
#[derive(Debug, Clone)]
pub struct Task {
    pub description: String,
    pub start: NaiveDateTime,
    /// None while the task is running.
    pub stop: Option<NaiveDateTime>,
    /// Worked time. `stop - start` for a completed task, zero for a running
    /// one; grouping by name replaces it with the aggregate over all
    /// intervals sharing this task's identity.
    pub worked: Duration,
    /// Small per-query integer for user reference; assigned by the history
    /// engine, never persisted.
    pub display_id: Option<u32>,
}

impl Task {
    /// Create a task. Commas are replaced with spaces because the history
    /// file is comma-delimited.
    pub fn new(description: &str, start: NaiveDateTime) -> Self {
        Self {
            description: description.trim().replace(',', " "),
            start,
            stop: None,
            worked: Duration::zero(),
            display_id: None,
        }
    }

    pub fn completed(description: &str, start: NaiveDateTime, stop: NaiveDateTime) -> Self {
        Self {
            stop: Some(stop),
            worked: stop - start,
            ..Self::new(description, start)
        }
    }

    /// Deterministic content-derived identity: SHA-256 of the description.
    pub fn identity(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.description.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// First `@context` marker in the description, if any. Later markers
    /// are ignored: a task has at most one context.
    pub fn context(&self) -> Option<String> {
        context_re()
            .find(&self.description)
            .map(|m| m.as_str().to_string())
    }

    /// All `+tag` markers in the description.
    pub fn tags(&self) -> Vec<String> {
        tag_re()
            .find_iter(&self.description)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Worked time: `stop - start`, or zero while still running.
    pub fn duration(&self) -> Duration {
        self.worked
    }

    pub fn is_running(&self) -> bool {
        self.stop.is_none()
    }

    /// The day this task was completed (`YYYY-MM-DD`), or None while running.
    pub fn stop_date(&self) -> Option<String> {
        self.stop.map(|s| s.format("%Y-%m-%d").to_string())
    }

    /// ISO week number of the completion time, for week-scoped report queries.
    pub fn week_no(&self) -> Option<String> {
        self.stop.map(|s| s.format("%V").to_string())
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
    }
}

impl Eq for Task {}
