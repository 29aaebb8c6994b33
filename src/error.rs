// Core error taxonomy
//
// Recoverable conditions carry enough data for the CLI to explain them:
// AlreadyRunning returns the task that is in the way, InvalidInterval the
// two offending timestamps.

use crate::models::Task;
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    /// No recognized date/time pattern matched the input.
    #[error("time format not recognized: '{0}'")]
    TimeFormat(String),

    /// A start was attempted while another task is running.
    /// The running task rides along so the caller can display it.
    #[error("another task is running: {}", .0.description)]
    AlreadyRunning(Box<Task>),

    /// Stop time precedes start time; the running record is left untouched.
    #[error("stop time ({stop}) is earlier than start time ({start})")]
    InvalidInterval {
        start: NaiveDateTime,
        stop: NaiveDateTime,
    },

    /// A history line had an unexpected field count. Malformed history means
    /// data corruption, so this fails fast instead of skipping the line.
    #[error("history line has {count} fields, expected 4 or 5: '{line}'")]
    HistoryFormat { count: usize, line: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
