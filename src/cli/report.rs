// Report queries
//
// Translates the free-form `lets see <query>` argument into a task filter.
// A query that reads as a date narrows to that day; "week"/"month"/"year"
// words widen the date format accordingly; anything else falls back to a
// substring match on the completion date or the description.

use crate::config::Config;
use crate::models::Task;
use crate::repo::{group_by_date, group_by_name, History, TaskStore};
use crate::utils::parse_time;
use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use log::debug;

use super::output::{color_enabled, render_dot_list, render_report, RenderOptions};

/// Queries for which the running task still belongs in the report.
const CURRENT_QUERIES: &[&str] = &["today", "now", "this week", "this month"];

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone)]
pub struct SeeOptions {
    pub query: Option<String>,
    pub detailed: bool,
    pub day_by_day: bool,
    pub ascii: bool,
    pub dot_list: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    /// The whole history.
    All,
    /// Tasks completed in one ISO week of the current year.
    Week { week: String, year: String },
    /// Substring match against the completion date or the description.
    Text(String),
}

impl QueryFilter {
    /// Build a filter and a report title from the raw query. No query means
    /// "today".
    pub fn build(query: Option<&str>, now: NaiveDateTime) -> (QueryFilter, String) {
        let Some(query) = query else {
            let today = now.format("%Y-%m-%d").to_string();
            return (QueryFilter::Text(today.clone()), today);
        };
        if query == "all" {
            return (QueryFilter::All, "all".to_string());
        }

        let lower = query.to_lowercase();
        let fmt = time_format_for(&lower);
        match resolve_anchor(query, &lower, now) {
            Some(anchor) => {
                let formatted = anchor.format(fmt).to_string();
                if fmt == "%V" {
                    let title = format!("week {}", formatted);
                    let year = now.format("%Y").to_string();
                    (
                        QueryFilter::Week {
                            week: formatted,
                            year,
                        },
                        title,
                    )
                } else {
                    (QueryFilter::Text(formatted.clone()), formatted)
                }
            }
            None => {
                debug!("query '{}' does not seem to be a date", query);
                (QueryFilter::Text(query.to_string()), query.to_string())
            }
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            QueryFilter::All => true,
            QueryFilter::Week { week, year } => {
                task.week_no().as_deref() == Some(week)
                    && task
                        .stop
                        .map(|s| s.format("%Y").to_string() == *year)
                        .unwrap_or(false)
            }
            QueryFilter::Text(needle) => {
                task.stop_date().map_or(false, |d| d.contains(needle))
                    || task.description.contains(needle)
            }
        }
    }
}

/// Pick the date granularity the query implies.
fn time_format_for(lower: &str) -> &'static str {
    if lower.contains("year") {
        "%Y"
    } else if lower.contains("week") {
        "%V"
    } else if lower.contains("month") || MONTHS.iter().any(|m| lower.contains(m)) {
        "%Y-%m"
    } else {
        "%Y-%m-%d"
    }
}

/// Resolve the query to an anchor timestamp when it names one: a handful of
/// relative words, or anything the time parser recognizes.
fn resolve_anchor(query: &str, lower: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    match lower {
        "today" | "now" | "this week" | "this month" | "this year" => Some(now),
        "yesterday" => Some(now - Duration::days(1)),
        "last week" => Some(now - Duration::days(7)),
        "last month" => previous_month(now),
        "last year" => NaiveDate::from_ymd_opt(now.year() - 1, 1, 1)?.and_hms_opt(0, 0, 0),
        _ => parse_time(query).ok(),
    }
}

fn previous_month(now: NaiveDateTime) -> Option<NaiveDateTime> {
    let (year, month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)
}

/// Run a `lets see` report against the history.
pub fn do_report(config: &Config, opts: &SeeOptions) -> Result<()> {
    let now = Local::now().naive_local();
    let (filter, title) = QueryFilter::build(opts.query.as_deref(), now);

    let history = History::new(config);
    let mut tasks = history.get_tasks_where(|t| filter.matches(t))?;

    let render = RenderOptions {
        ascii: opts.ascii,
        detailed: opts.detailed,
        color: color_enabled(config.color),
    };

    if opts.detailed {
        // One row per interval, oldest first.
        tasks.reverse();
        println!("{}", render_report(&tasks, Some(&title), &render));
        return Ok(());
    }

    if opts.day_by_day {
        for (day, day_tasks) in group_by_date(tasks) {
            let mut grouped = group_by_name(&day_tasks);
            grouped.sort_by(|a, b| b.worked.cmp(&a.worked));
            println!("{}", render_report(&grouped, Some(&day), &render));
        }
        return Ok(());
    }

    let mut grouped = group_by_name(&tasks);

    if opts.dot_list {
        print!("{}", render_dot_list(&grouped, &title, render.color));
        return Ok(());
    }

    if let Some(mut running) = TaskStore::new(config).get_running()? {
        if running_belongs(&running, opts.query.as_deref()) {
            running.worked = now - running.start;
            grouped.insert(0, running);
        }
    }

    println!("{}", render_report(&grouped, Some(&title), &render));
    Ok(())
}

/// The running task is shown alongside "current" queries and whenever the
/// query text appears in its description.
fn running_belongs(running: &Task, query: Option<&str>) -> bool {
    match query {
        None => true,
        Some(q) => {
            CURRENT_QUERIES.contains(&q.to_lowercase().as_str())
                || running.description.contains(q)
        }
    }
}
