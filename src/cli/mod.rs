pub mod commands;
pub mod output;
pub mod report;

pub use commands::*;
pub use output::*;
pub use report::*;
