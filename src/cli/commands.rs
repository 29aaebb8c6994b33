use crate::config::Config;
use crate::error::TaskError;
use crate::repo::{History, TaskStore};
use crate::utils::duration::{format_duration, DEFAULT_FMT};
use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::debug;

use super::report::{do_report, SeeOptions};

#[derive(Parser)]
#[command(name = "lets")]
#[command(about = "Letsdo - a personal command-line time tracker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start working on a task (name, or the ID of a past task)
    #[command(visible_alias = "do")]
    Start {
        /// Task description; @context and +tag markers are picked up
        name: Vec<String>,
        /// Explicit start time (e.g. "9:30", "2024-03-01 14:00")
        #[arg(short = 't', long)]
        time: Option<String>,
    },
    /// Stop the running task and record it in history
    Stop {
        /// Explicit stop time; defaults to now
        time: Vec<String>,
    },
    /// Discard the running task without recording it
    Cancel,
    /// Show what is being worked on and for how long
    Status,
    /// Stop the running task and switch to another one
    Goto {
        /// Task description or the ID of a past task
        target: Vec<String>,
    },
    /// Show reports from the task history
    See {
        /// Date, "yesterday", "this week", a +tag, a @context, free text,
        /// or "all"
        query: Vec<String>,
        /// One row per recorded interval instead of grouping by name
        #[arg(long)]
        detailed: bool,
        /// One table per day
        #[arg(long = "day-by-day")]
        day_by_day: bool,
        /// Plain ASCII table borders
        #[arg(short = 'a', long)]
        ascii: bool,
        /// Compact bullet list instead of a table
        #[arg(long = "dot-list")]
        dot_list: bool,
    },
    /// Open the history file in $EDITOR
    Edit,
    /// Open the configuration file in $EDITOR
    Config,
    /// Print the bash completion script
    Autocomplete,
}

pub fn run() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let cli = Cli::parse();
    let config = Config::load_default()?;
    dispatch(&cli.command, &config)
}

fn dispatch(command: &Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Start { name, time } => start(config, &name.join(" "), time.as_deref()),
        Commands::Stop { time } => stop(config, join_opt(time).as_deref()),
        Commands::Cancel => cancel(config),
        Commands::Status => status(config),
        Commands::Goto { target } => goto(config, &target.join(" ")),
        Commands::See {
            query,
            detailed,
            day_by_day,
            ascii,
            dot_list,
        } => do_report(
            config,
            &SeeOptions {
                query: join_opt(query),
                detailed: *detailed,
                day_by_day: *day_by_day,
                ascii: *ascii,
                dot_list: *dot_list,
            },
        ),
        Commands::Edit => edit_file(&config.history_file_path()),
        Commands::Config => edit_file(&Config::config_file_path()?),
        Commands::Autocomplete => {
            print!("{}", COMPLETION_SCRIPT);
            Ok(())
        }
    }
}

fn join_opt(words: &[String]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn start(config: &Config, name: &str, time: Option<&str>) -> Result<()> {
    if name.trim().is_empty() {
        bail!("missing task description");
    }
    let description = resolve_description(config, name)?;
    let store = TaskStore::new(config);
    match store.start(&description, time) {
        Ok(task) => {
            println!(
                "started '{}' at {}",
                task.description,
                task.start.format("%H:%M")
            );
            Ok(())
        }
        Err(TaskError::AlreadyRunning(running)) => {
            bail!(
                "another task is running: '{}' (since {})",
                running.description,
                running.start.format("%Y-%m-%d %H:%M")
            );
        }
        Err(e) => Err(e.into()),
    }
}

/// A bare integer names an already recorded task by its report ID
/// (e.g. `lets start 3`); anything else is a fresh description.
fn resolve_description(config: &Config, name: &str) -> Result<String> {
    let Ok(id) = name.trim().parse::<u32>() else {
        return Ok(name.to_string());
    };
    debug!("looking up task with ID {id}");
    let tasks = History::new(config).get_tasks_where(|t| t.display_id == Some(id))?;
    match tasks.first() {
        Some(task) => Ok(task.description.clone()),
        None => bail!("could not find task with ID {id}"),
    }
}

fn stop(config: &Config, time: Option<&str>) -> Result<()> {
    let store = TaskStore::new(config);
    match store.stop(time) {
        Ok(Some(task)) => {
            println!(
                "stopped '{}' after {}",
                task.description,
                format_duration(task.duration(), DEFAULT_FMT).trim_start()
            );
            Ok(())
        }
        Ok(None) => bail!("no task running"),
        Err(TaskError::InvalidInterval { start, stop }) => {
            bail!("stop time {stop} is earlier than start time {start}")
        }
        Err(e) => Err(e.into()),
    }
}

fn cancel(config: &Config) -> Result<()> {
    match TaskStore::new(config).cancel()? {
        Some(task) => {
            println!("cancelled '{}'", task.description);
            Ok(())
        }
        None => bail!("no task running, nothing to do"),
    }
}

fn status(config: &Config) -> Result<()> {
    match TaskStore::new(config).status()? {
        Some(task) => {
            let elapsed = Local::now().naive_local() - task.start;
            println!(
                "working on '{}' for {}",
                task.description,
                format_duration(elapsed, "{H}h {M:02}m {S:02}s")
            );
            Ok(())
        }
        None => bail!("no task running"),
    }
}

/// Stop whatever is running (at this instant) and start the target task.
/// From idle this is just a start.
fn goto(config: &Config, target: &str) -> Result<()> {
    if target.trim().is_empty() {
        bail!("missing task description");
    }
    let description = resolve_description(config, target)?;
    let store = TaskStore::new(config);
    if let Some(stopped) = store.stop(None)? {
        println!("stopped '{}'", stopped.description);
    }
    let task = store.start(&description, None).map_err(|e| match e {
        TaskError::AlreadyRunning(running) => anyhow::anyhow!(
            "another task is running: '{}'",
            running.description
        ),
        other => other.into(),
    })?;
    println!("switched to '{}'", task.description);
    Ok(())
}

fn edit_file(path: &std::path::Path) -> Result<()> {
    let editor = std::env::var("EDITOR").context("EDITOR is not set")?;
    let status = std::process::Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch {editor}"))?;
    if !status.success() {
        bail!("{editor} exited with {status}");
    }
    Ok(())
}

/// Bash completion: subcommands, plus contexts and tags already used in the
/// history so `lets see @<TAB>` and `lets start +<TAB>` work.
const COMPLETION_SCRIPT: &str = r#"# bash completion for lets
# Install: source this file from your .bashrc, or drop it under
# /etc/bash_completion.d/
_lets() {
    local cur words
    cur="${COMP_WORDS[COMP_CWORD]}"
    if [ "$COMP_CWORD" -eq 1 ]; then
        words="start stop cancel status goto see edit config autocomplete"
    else
        words="$(grep -oE '[@+][[:alnum:]_-]+' "${HOME}/letsdo-history" 2>/dev/null | sort -u)"
    fi
    COMPREPLY=( $(compgen -W "${words}" -- "${cur}") )
}
complete -F _lets lets
"#;
