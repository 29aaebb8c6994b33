// Persistence layer: the running-task record and the append-only history log

pub mod history;
pub mod running;

pub use history::*;
pub use running::*;
