// Date/time parsing, duration formatting and task-name sanitizing

pub mod date;
pub mod duration;
pub mod sanitize;

pub use date::{parse_time, parse_time_at, truncate_to_minute};
pub use duration::{format_duration, format_scalar, InputUnit};
pub use sanitize::sanitize;
