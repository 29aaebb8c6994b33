// Task-name sanitizing for lines imported from todo lists
//
// Fixed transform order: leading list marker, leading date token, Markdown
// link. Only the first Markdown link is rewritten; with more than one link
// on a line the greedy pattern spans them all and collapses to the first
// capture, which is long-standing observed behavior and kept as-is.

use regex::Regex;
use std::sync::OnceLock;

fn list_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\-\*]").unwrap())
}

fn dashed_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+-\d+-\d+\s+").unwrap())
}

fn slashed_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+/\d+\s+").unwrap())
}

fn md_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*)\]\(.*\)").unwrap())
}

/// Strip list markers, leading dates and Markdown link syntax from a line
/// of text. Pure transform; the input is otherwise left untouched.
pub fn sanitize(text: &str) -> String {
    let text = list_marker_re().replace(text, "");
    let text = dashed_date_re().replace(&text, "");
    let text = slashed_date_re().replace(&text, "");
    md_link_re().replace(&text, "$1").into_owned()
}
