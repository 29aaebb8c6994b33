// Report rendering
//
// Tables follow the classic letsdo layout: outer border with the title
// embedded in the top rule, no inner column borders, a heading rule and a
// footing rule around the totals row. Unicode box drawing by default,
// plain ASCII with --ascii.

use crate::models::Task;
use crate::utils::duration::{format_duration, DEFAULT_FMT};
use chrono::Duration;
use std::io::IsTerminal;

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_CYAN: &str = "\x1b[36m";

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub ascii: bool,
    pub detailed: bool,
    pub color: bool,
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

struct Borders {
    horizontal: char,
    vertical: char,
    top_left: char,
    top_right: char,
    mid_left: char,
    mid_right: char,
    bottom_left: char,
    bottom_right: char,
}

const UNICODE_BORDERS: Borders = Borders {
    horizontal: '─',
    vertical: '│',
    top_left: '┌',
    top_right: '┐',
    mid_left: '├',
    mid_right: '┤',
    bottom_left: '└',
    bottom_right: '┘',
};

const ASCII_BORDERS: Borders = Borders {
    horizontal: '-',
    vertical: '|',
    top_left: '+',
    top_right: '+',
    mid_left: '+',
    mid_right: '+',
    bottom_left: '+',
    bottom_right: '+',
};

/// Whether report output should be colorized: the configuration flag gates
/// it, and piped output is never colored.
pub fn color_enabled(config_color: bool) -> bool {
    config_color && std::io::stdout().is_terminal()
}

/// Render a task table. `tasks` are already grouped/ordered by the caller;
/// a running task is the one without a stop time and shows ID "R".
pub fn render_report(tasks: &[Task], title: Option<&str>, opts: &RenderOptions) -> String {
    if tasks.is_empty() {
        return format!("Nothing to show for {}", title.unwrap_or("today"));
    }

    let total: Duration = tasks
        .iter()
        .fold(Duration::zero(), |acc, t| acc + t.worked);

    let mut header = vec!["ID", "Last update", "Work time", "Description"];
    if opts.detailed {
        header.insert(3, "Interval");
    }
    let header: Vec<String> = header.into_iter().map(String::from).collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for task in tasks {
        let id = match task.display_id {
            Some(id) => id.to_string(),
            None => "R".to_string(),
        };
        let last_update = match task.stop {
            Some(stop) => stop.format("%d-%m-%Y w%V").to_string(),
            None => task.start.format("%Y-%m-%d %H:%M").to_string(),
        };
        let percent = if total > Duration::zero() {
            (task.worked.num_seconds() * 100) / total.num_seconds()
        } else {
            0
        };
        let work = format!("{} {:2}%", format_duration(task.worked, DEFAULT_FMT), percent);

        let mut row = vec![id, last_update, work, wrap_description(&task.description)];
        if opts.detailed {
            let interval = match task.stop {
                Some(stop) => {
                    format!("{} -> {}", task.start.format("%H:%M"), stop.format("%H:%M"))
                }
                None => format!("{} -> ...", task.start.format("%H:%M")),
            };
            row.insert(3, interval);
        }
        rows.push(row);
    }

    let recap = if tasks.len() > 1 { "activities," } else { "activity," };
    let mut footer = vec![
        tasks.len().to_string(),
        recap.to_string(),
        "total time:".to_string(),
        format_duration(total, DEFAULT_FMT),
    ];
    if opts.detailed {
        footer.push(String::new());
    }

    let mut aligns = vec![Align::Right, Align::Center, Align::Right, Align::Left];
    if opts.detailed {
        aligns.insert(3, Align::Left);
    }

    draw_table(title, &header, &rows, &footer, &aligns, opts)
}

/// Render the `--dot-list` form: a plain bullet per unique task.
pub fn render_dot_list(tasks: &[Task], title: &str, color: bool) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&paint(title, ANSI_BOLD, color));
    out.push('\n');
    for task in tasks {
        let id = task
            .display_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "R".to_string());
        out.push_str(&format!(" ● ({}) {}\n", id, task.description));
    }
    out
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("{}{}{}", code, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Soft-break long descriptions at a word boundary so the table stays
/// within a sane width; the continuation line is marked with ⤷.
fn wrap_description(description: &str) -> String {
    let limit = description_limit();
    if description.chars().count() <= limit {
        return description.to_string();
    }
    let break_search_start = limit.saturating_sub(8);
    let chars: Vec<char> = description.chars().collect();
    let word_break = chars[break_search_start..]
        .iter()
        .position(|c| *c == ' ')
        .map(|p| p + break_search_start)
        .unwrap_or(break_search_start);
    let head: String = chars[..word_break].iter().collect();
    let tail: String = chars[word_break..].iter().collect();
    format!("{}\n ⤷{}", head, tail)
}

fn description_limit() -> usize {
    // Leave room for the fixed columns, never below a readable minimum.
    match terminal_size::terminal_size() {
        Some((terminal_size::Width(w), _)) => ((w as usize).saturating_sub(40)).clamp(24, 53),
        None => 53,
    }
}

fn draw_table(
    title: Option<&str>,
    header: &[String],
    rows: &[Vec<String>],
    footer: &[String],
    aligns: &[Align],
    opts: &RenderOptions,
) -> String {
    let borders = if opts.ascii { ASCII_BORDERS } else { UNICODE_BORDERS };
    let ncols = header.len();

    let mut widths = vec![0usize; ncols];
    let mut measure = |cells: &[String]| {
        for (i, cell) in cells.iter().enumerate() {
            for line in cell.lines() {
                widths[i] = widths[i].max(line.chars().count());
            }
        }
    };
    measure(header);
    for row in rows {
        measure(row);
    }
    measure(footer);

    // One space of padding at each edge, two spaces between columns
    // (no inner column borders).
    let inner: usize = widths.iter().sum::<usize>() + 2 * (ncols - 1) + 2;

    let mut out = String::from("\n");
    out.push_str(&top_rule(title, inner, &borders, opts.color));
    out.push_str(&format_row(header, &widths, aligns, &borders, opts.color, true));
    out.push_str(&rule(borders.mid_left, borders.mid_right, inner, &borders));
    for row in rows {
        out.push_str(&format_row(row, &widths, aligns, &borders, false, false));
    }
    out.push_str(&rule(borders.mid_left, borders.mid_right, inner, &borders));
    out.push_str(&format_row(footer, &widths, aligns, &borders, opts.color, true));
    out.push_str(&rule(borders.bottom_left, borders.bottom_right, inner, &borders));
    out
}

fn top_rule(title: Option<&str>, inner: usize, borders: &Borders, color: bool) -> String {
    let mut line = String::new();
    line.push(borders.top_left);
    match title {
        Some(title) if !title.is_empty() => {
            let shown = format!(" {} ", title);
            let shown_len = shown.chars().count().min(inner);
            line.push_str(&paint(&shown, ANSI_FG_CYAN, color));
            for _ in shown_len..inner {
                line.push(borders.horizontal);
            }
        }
        _ => {
            for _ in 0..inner {
                line.push(borders.horizontal);
            }
        }
    }
    line.push(borders.top_right);
    line.push('\n');
    line
}

fn rule(left: char, right: char, inner: usize, borders: &Borders) -> String {
    let mut line = String::new();
    line.push(left);
    for _ in 0..inner {
        line.push(borders.horizontal);
    }
    line.push(right);
    line.push('\n');
    line
}

fn format_row(
    cells: &[String],
    widths: &[usize],
    aligns: &[Align],
    borders: &Borders,
    color: bool,
    emphasize: bool,
) -> String {
    let height = cells
        .iter()
        .map(|c| c.lines().count().max(1))
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    for line_no in 0..height {
        let mut parts = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let text = cell.lines().nth(line_no).unwrap_or("");
            let padded = pad(text, widths[i], aligns[i]);
            parts.push(if emphasize {
                paint(&padded, ANSI_BOLD, color)
            } else {
                padded
            });
        }
        out.push(borders.vertical);
        out.push(' ');
        out.push_str(&parts.join("  "));
        out.push(' ');
        out.push(borders.vertical);
        out.push('\n');
    }
    out
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let len = text.chars().count();
    let gap = width.saturating_sub(len);
    match align {
        Align::Left => format!("{}{}", text, " ".repeat(gap)),
        Align::Right => format!("{}{}", " ".repeat(gap), text),
        Align::Center => {
            let left = gap / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(gap - left))
        }
    }
}
