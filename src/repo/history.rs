// History Query Engine
//
// Reads the append-only log back into Task entities. Records are processed
// in reverse chronological order so that the most recently touched distinct
// task gets display ID 1; the identity-to-ID map is rebuilt on every call
// and never persisted, which keeps the small integers recency-biased.

use crate::config::Config;
use crate::error::{Result, TaskError};
use crate::models::Task;
use crate::utils::{parse_time, sanitize};
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::fs;

pub struct History<'a> {
    config: &'a Config,
}

/// Result of [`group_task_by`]. An unrecognized key is not an error: the
/// input comes back unchanged.
#[derive(Debug)]
pub enum Grouped {
    ByName(Vec<Task>),
    ByDate(BTreeMap<String, Vec<Task>>),
    Ungrouped(Vec<Task>),
}

impl<'a> History<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// All recorded tasks, most recent first, with display IDs assigned.
    pub fn get_tasks(&self) -> Result<Vec<Task>> {
        self.get_tasks_where(|_| true)
    }

    /// Recorded tasks matching `predicate`, most recent first.
    ///
    /// Lines have either 4 fields (`date,description,start,stop`) or the
    /// legacy 5 (`date,description,worked_time,start,stop`) where the stale
    /// worked_time is ignored and recomputed. Any other field count fails
    /// fast; a malformed history file is corruption worth surfacing.
    pub fn get_tasks_where<F>(&self, predicate: F) -> Result<Vec<Task>>
    where
        F: Fn(&Task) -> bool,
    {
        let path = self.config.history_file_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no task recorded yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut ids: HashMap<String, u32> = HashMap::new();
        let mut next_id = 1;
        let mut tasks = Vec::new();

        for line in text.lines().rev() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() > 1 && fields[1].trim().is_empty() {
                continue;
            }
            let (description, start, stop) = match fields.len() {
                4 => (fields[1], fields[2], fields[3]),
                5 => (fields[1], fields[3], fields[4]),
                count => {
                    return Err(TaskError::HistoryFormat {
                        count,
                        line: line.to_string(),
                    })
                }
            };

            let mut task = Task::completed(
                &sanitize(description),
                parse_time(start)?,
                parse_time(stop)?,
            );

            // Tasks sharing an identity share a display ID; a new identity
            // takes the next integer, first seen in reverse order wins.
            let id = *ids.entry(task.identity()).or_insert_with(|| {
                let id = next_id;
                next_id += 1;
                id
            });
            task.display_id = Some(id);

            if predicate(&task) {
                tasks.push(task);
            }
        }

        Ok(tasks)
    }
}

/// Group tasks by `"name"` (one row per unique identity, durations summed)
/// or `"date"` (partitioned by completion day). An unsupported key logs a
/// warning and returns the input unchanged.
pub fn group_task_by(tasks: Vec<Task>, key: &str) -> Grouped {
    match key {
        "name" => Grouped::ByName(group_by_name(&tasks)),
        "date" => Grouped::ByDate(group_by_date(tasks)),
        other => {
            warn!("could not group tasks by: {other}");
            Grouped::Ungrouped(tasks)
        }
    }
}

/// Deduplicate by identity preserving first-occurrence order; each unique
/// task's worked time becomes the sum over every interval sharing it.
pub fn group_by_name(tasks: &[Task]) -> Vec<Task> {
    let mut uniques: Vec<Task> = Vec::new();
    for task in tasks {
        if !uniques.iter().any(|u| u == task) {
            uniques.push(task.clone());
        }
    }
    for unique in &mut uniques {
        unique.worked = tasks
            .iter()
            .filter(|t| **t == *unique)
            .fold(chrono::Duration::zero(), |acc, t| acc + t.worked);
    }
    uniques
}

/// Partition by completion date (`YYYY-MM-DD` of the stop time). Running
/// tasks have no completion date and are left out.
pub fn group_by_date(tasks: Vec<Task>) -> BTreeMap<String, Vec<Task>> {
    let mut map: BTreeMap<String, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(date) = task.stop_date() {
            map.entry(date).or_default().push(task);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn setup(history: &str) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());
        fs::write(config.history_file_path(), history).unwrap();
        (dir, config)
    }

    #[test]
    fn test_missing_history_is_empty_not_an_error() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());
        let tasks = History::new(&config).get_tasks().unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_tasks_come_back_most_recent_first() {
        let (_dir, config) = setup(
            "2024-03-01,older,2024-03-01 09:00,2024-03-01 10:00\n\
             2024-03-02,newer,2024-03-02 09:00,2024-03-02 10:00\n",
        );
        let tasks = History::new(&config).get_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "newer");
        assert_eq!(tasks[1].description, "older");
    }

    #[test]
    fn test_display_ids_favor_recent_tasks() {
        let (_dir, config) = setup(
            "2024-03-01,old one,2024-03-01 09:00,2024-03-01 10:00\n\
             2024-03-02,recent one,2024-03-02 09:00,2024-03-02 10:00\n",
        );
        let tasks = History::new(&config).get_tasks().unwrap();
        assert_eq!(tasks[0].display_id, Some(1)); // most recent
        assert_eq!(tasks[1].display_id, Some(2));
    }

    #[test]
    fn test_repeated_task_shares_one_display_id() {
        let (_dir, config) = setup(
            "2024-03-01,task A,2024-03-01 09:00,2024-03-01 10:00\n\
             2024-03-02,task A,2024-03-02 09:00,2024-03-02 09:30\n",
        );
        let tasks = History::new(&config).get_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].display_id, Some(1));
        assert_eq!(tasks[1].display_id, Some(1));
    }

    #[test]
    fn test_legacy_five_field_lines_ignore_worked_time() {
        let (_dir, config) = setup(
            "2024-03-01,legacy task, 3h 00m,2024-03-01 09:00,2024-03-01 10:00\n",
        );
        let tasks = History::new(&config).get_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "legacy task");
        // Recomputed from start/stop, not taken from the stale field.
        assert_eq!(tasks[0].duration(), Duration::hours(1));
    }

    #[test]
    fn test_malformed_field_count_fails_fast() {
        let (_dir, config) = setup("2024-03-01,only-three-fields,2024-03-01 09:00\n");
        let err = History::new(&config).get_tasks().unwrap_err();
        assert!(matches!(err, TaskError::HistoryFormat { count: 3, .. }));
    }

    #[test]
    fn test_predicate_filters() {
        let (_dir, config) = setup(
            "2024-03-01,write @office,2024-03-01 09:00,2024-03-01 10:00\n\
             2024-03-01,rest @home,2024-03-01 10:00,2024-03-01 11:00\n",
        );
        let tasks = History::new(&config)
            .get_tasks_where(|t| t.context() == Some("@office".to_string()))
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "write @office");
    }

    #[test]
    fn test_group_by_name_sums_durations() {
        let (_dir, config) = setup(
            "2024-03-01,task A,2024-03-01 09:00,2024-03-01 10:00\n\
             2024-03-01,task B,2024-03-01 10:00,2024-03-01 10:30\n\
             2024-03-02,task A,2024-03-02 09:00,2024-03-02 09:45\n",
        );
        let tasks = History::new(&config).get_tasks().unwrap();
        let grouped = group_by_name(&tasks);
        assert_eq!(grouped.len(), 2);

        let a = grouped.iter().find(|t| t.description == "task A").unwrap();
        assert_eq!(a.duration(), Duration::minutes(105));
        let b = grouped.iter().find(|t| t.description == "task B").unwrap();
        assert_eq!(b.duration(), Duration::minutes(30));
    }

    #[test]
    fn test_group_by_date_partitions_on_stop_day() {
        let (_dir, config) = setup(
            "2024-03-01,task A,2024-03-01 09:00,2024-03-01 10:00\n\
             2024-03-02,task B,2024-03-02 09:00,2024-03-02 10:00\n\
             2024-03-02,task C,2024-03-02 10:00,2024-03-02 11:00\n",
        );
        let tasks = History::new(&config).get_tasks().unwrap();
        let by_date = group_by_date(tasks);
        assert_eq!(by_date.len(), 2);
        assert_eq!(by_date["2024-03-01"].len(), 1);
        assert_eq!(by_date["2024-03-02"].len(), 2);
    }

    #[test]
    fn test_unknown_group_key_returns_input_unchanged() {
        let (_dir, config) = setup("2024-03-01,task A,2024-03-01 09:00,2024-03-01 10:00\n");
        let tasks = History::new(&config).get_tasks().unwrap();
        match group_task_by(tasks, "flavor") {
            Grouped::Ungrouped(tasks) => assert_eq!(tasks.len(), 1),
            other => panic!("unexpected grouping: {other:?}"),
        }
    }

    #[test]
    fn test_descriptions_are_sanitized_on_read() {
        let (_dir, config) = setup(
            "2024-03-01,- [notes](https://example.com) review,2024-03-01 09:00,2024-03-01 10:00\n",
        );
        let tasks = History::new(&config).get_tasks().unwrap();
        assert_eq!(tasks[0].description, "notes review");
    }
}
