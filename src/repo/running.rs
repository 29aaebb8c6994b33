// Task Store: the single-running-task state machine
//
// Idle (no record) -> Running (record exists) -> Idle again via stop (which
// appends to history) or cancel (which discards). The record's existence is
// the running signal; it is written atomically and removed on both exits.

use crate::config::Config;
use crate::error::{Result, TaskError};
use crate::models::{Task, TIME_FORMAT};
use crate::utils::{parse_time, truncate_to_minute};
use chrono::Local;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;

/// On-disk shape of the running-task record.
#[derive(Debug, Serialize, Deserialize)]
struct RunningRecord {
    name: String,
    start: String,
}

pub struct TaskStore<'a> {
    config: &'a Config,
}

impl<'a> TaskStore<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Start a task. Fails with [`TaskError::AlreadyRunning`] carrying the
    /// task that is already in progress; nothing is mutated in that case.
    pub fn start(&self, description: &str, start_time: Option<&str>) -> Result<Task> {
        if let Some(running) = self.get_running()? {
            return Err(TaskError::AlreadyRunning(Box::new(running)));
        }

        let start = match start_time {
            Some(text) => parse_time(text)?,
            None => truncate_to_minute(Local::now().naive_local()),
        };
        let task = Task::new(description, start);
        self.write_record(&task)?;
        info!("started '{}' at {}", task.description, task.start);
        Ok(task)
    }

    /// The currently running task, if any. Pure read; a missing record
    /// means no task is running, not an error.
    pub fn get_running(&self) -> Result<Option<Task>> {
        let path = self.config.task_file_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no task running");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let record: RunningRecord = serde_json::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let start = parse_time(&record.start)?;
        Ok(Some(Task::new(&record.name, start)))
    }

    /// Stop the running task: append one record to history, then delete the
    /// running record. Returns None when idle. A stop time earlier than the
    /// start time is rejected without touching any state.
    pub fn stop(&self, stop_time: Option<&str>) -> Result<Option<Task>> {
        let Some(running) = self.get_running()? else {
            info!("no task running");
            return Ok(None);
        };

        let stop = match stop_time {
            Some(text) => parse_time(text)?,
            None => truncate_to_minute(Local::now().naive_local()),
        };
        if stop < running.start {
            return Err(TaskError::InvalidInterval {
                start: running.start,
                stop,
            });
        }

        let task = Task::completed(&running.description, running.start, stop);
        self.append_history(&task, stop)?;
        fs::remove_file(self.config.task_file_path())?;
        info!("stopped '{}' at {}", task.description, stop);
        Ok(Some(task))
    }

    /// Discard the running task without writing to history.
    pub fn cancel(&self) -> Result<Option<Task>> {
        let Some(running) = self.get_running()? else {
            info!("no task running");
            return Ok(None);
        };
        fs::remove_file(self.config.task_file_path())?;
        info!("cancelled '{}'", running.description);
        Ok(Some(running))
    }

    /// Same read as [`get_running`](Self::get_running), kept as its own name
    /// for display call sites (elapsed = now - start).
    pub fn status(&self) -> Result<Option<Task>> {
        self.get_running()
    }

    /// Write the record whole to a sibling temp file, then rename it into
    /// place so a failed write never leaves a half-written record.
    fn write_record(&self, task: &Task) -> Result<()> {
        fs::create_dir_all(&self.config.data_directory)?;
        let record = RunningRecord {
            name: task.description.clone(),
            start: task.start.format(TIME_FORMAT).to_string(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let path = self.config.task_file_path();
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// The only history-mutating operation in the whole tool: one appended
    /// line, `stop_date,description,start,stop`, minute precision.
    fn append_history(&self, task: &Task, stop: chrono::NaiveDateTime) -> Result<()> {
        let line = format!(
            "{},{},{},{}\n",
            stop.format("%Y-%m-%d"),
            task.description,
            task.start.format(TIME_FORMAT),
            stop.format(TIME_FORMAT),
        );
        fs::create_dir_all(&self.config.data_directory)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.config.history_file_path())?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());
        (dir, config)
    }

    #[test]
    fn test_start_creates_running_record() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        let task = store.start("write +report @office", None).unwrap();
        assert!(config.task_file_path().exists());
        assert!(task.is_running());
    }

    #[test]
    fn test_running_record_round_trip() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        let started = store.start("deep work", Some("2024-03-01 09:30")).unwrap();
        let running = store.get_running().unwrap().unwrap();
        assert_eq!(running.description, started.description);
        assert_eq!(running.start, started.start);
    }

    #[test]
    fn test_start_while_running_fails_without_mutation() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        store.start("first", Some("2024-03-01 09:00")).unwrap();
        let before = fs::read_to_string(config.task_file_path()).unwrap();

        let err = store.start("second", None).unwrap_err();
        match err {
            TaskError::AlreadyRunning(task) => assert_eq!(task.description, "first"),
            other => panic!("unexpected error: {other:?}"),
        }
        let after = fs::read_to_string(config.task_file_path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_stop_appends_one_record_and_clears_state() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        store.start("write docs", Some("2024-03-01 15:00")).unwrap();
        let task = store.stop(Some("2024-03-01 15:05")).unwrap().unwrap();

        assert_eq!(task.duration(), chrono::Duration::minutes(5));
        assert!(!config.task_file_path().exists());

        let history = fs::read_to_string(config.history_file_path()).unwrap();
        assert_eq!(
            history,
            "2024-03-01,write docs,2024-03-01 15:00,2024-03-01 15:05\n"
        );
    }

    #[test]
    fn test_stop_before_start_is_rejected_and_preserves_state() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        store.start("x", Some("2024-03-01 15:00")).unwrap();

        let err = store.stop(Some("2024-03-01 14:00")).unwrap_err();
        assert!(matches!(err, TaskError::InvalidInterval { .. }));
        assert!(config.task_file_path().exists());
        assert!(!config.history_file_path().exists());
    }

    #[test]
    fn test_stop_when_idle_returns_none() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        assert!(store.stop(None).unwrap().is_none());
    }

    #[test]
    fn test_cancel_discards_without_history_write() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        store.start("task B", Some("2024-03-01 10:00")).unwrap();

        let cancelled = store.cancel().unwrap().unwrap();
        assert_eq!(cancelled.description, "task B");
        assert!(!config.task_file_path().exists());
        assert!(!config.history_file_path().exists());
    }

    #[test]
    fn test_cancel_when_idle_returns_none() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        assert!(store.cancel().unwrap().is_none());
    }

    #[test]
    fn test_stop_appends_after_earlier_records() {
        let (_dir, config) = setup();
        let store = TaskStore::new(&config);
        store.start("a", Some("2024-03-01 09:00")).unwrap();
        store.stop(Some("2024-03-01 10:00")).unwrap();
        store.start("b", Some("2024-03-01 10:00")).unwrap();
        store.stop(Some("2024-03-01 11:00")).unwrap();

        let history = fs::read_to_string(config.history_file_path()).unwrap();
        let lines: Vec<&str> = history.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(",a,"));
        assert!(lines[1].contains(",b,"));
    }
}
