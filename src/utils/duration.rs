// Human-readable duration formatting
//
// Templates use placeholder fields drawn from {W, D, H, M, S} (weeks, days,
// hours, minutes, seconds), each with an optional zero-pad width, in the
// style of strftime:
//
//     "{D:02}d {H:02}h {M:02}m {S:02}s"  ->  "05d 08h 04m 02s"
//     "{W}w {D}d {H}:{M:02}:{S:02}"      ->  "4w 5d 8:04:02"
//     "{H}h {S}s"                        ->  "72h 800s"
//
// Only the requested fields are decomposed, largest to smallest, each
// field's remainder feeding the next; units not requested fold into the
// next-larger requested field.

use chrono::Duration;

/// Default report template: hours and minutes.
pub const DEFAULT_FMT: &str = "{H:2}h {M:02}m";

/// Unit of a scalar input to [`format_scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl InputUnit {
    fn seconds(&self) -> i64 {
        match self {
            InputUnit::Seconds => 1,
            InputUnit::Minutes => 60,
            InputUnit::Hours => 3600,
            InputUnit::Days => 86400,
            InputUnit::Weeks => 604800,
        }
    }
}

#[derive(Debug)]
enum Token {
    Literal(String),
    Field { field: char, width: usize, zero_pad: bool },
}

const FIELD_SECONDS: &[(char, i64)] = &[
    ('W', 604800),
    ('D', 86400),
    ('H', 3600),
    ('M', 60),
    ('S', 1),
];

/// Format a duration with the given template.
pub fn format_duration(delta: Duration, fmt: &str) -> String {
    format_total_seconds(delta.num_seconds(), fmt)
}

/// Format a plain number of the given unit with the template; the amount is
/// converted to seconds first.
pub fn format_scalar(amount: i64, unit: InputUnit, fmt: &str) -> String {
    format_total_seconds(amount * unit.seconds(), fmt)
}

fn format_total_seconds(total: i64, fmt: &str) -> String {
    let tokens = tokenize(fmt);

    let requested: Vec<char> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Field { field, .. } => Some(*field),
            Token::Literal(_) => None,
        })
        .collect();

    // Divide out the requested fields in decreasing unit size so anything
    // not requested accumulates into the next-larger requested field.
    let mut remainder = total;
    let mut values = [(' ', 0i64); 5];
    let mut n = 0;
    for &(field, secs) in FIELD_SECONDS {
        if requested.contains(&field) {
            values[n] = (field, remainder / secs);
            remainder %= secs;
            n += 1;
        }
    }
    let value_of = |field: char| -> i64 {
        values[..n]
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    };

    let mut out = String::new();
    for token in &tokens {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Field { field, width, zero_pad } => {
                let v = value_of(*field);
                let w = *width;
                if *zero_pad {
                    out.push_str(&format!("{:0width$}", v, width = w));
                } else {
                    out.push_str(&format!("{:width$}", v, width = w));
                }
            }
        }
    }
    out
}

/// Split a template into literal runs and `{F}` / `{F:w}` / `{F:0w}` fields.
/// Braces that do not form a recognized field pass through verbatim.
fn tokenize(fmt: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = fmt;

    while let Some(open) = rest.find('{') {
        let Some(close_rel) = rest[open..].find('}') else {
            break;
        };
        let close = open + close_rel;
        if let Some(token) = parse_field(&rest[open + 1..close]) {
            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(token);
        } else {
            literal.push_str(&rest[..=close]);
        }
        rest = &rest[close + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

fn parse_field(spec: &str) -> Option<Token> {
    let mut chars = spec.chars();
    let field = chars.next()?;
    if !"WDHMS".contains(field) {
        return None;
    }
    let rest = chars.as_str();
    if rest.is_empty() {
        return Some(Token::Field { field, width: 0, zero_pad: false });
    }
    let width_spec = rest.strip_prefix(':')?;
    let zero_pad = width_spec.starts_with('0') && width_spec.len() > 1;
    let width: usize = width_spec.parse().ok()?;
    Some(Token::Field { field, width, zero_pad })
}
