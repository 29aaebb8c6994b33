// Core data model: the Task entity

pub mod task;

pub use task::*;
