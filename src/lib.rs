//! Letsdo - a personal command-line time tracker
//!
//! This library provides the core functionality for Letsdo, including:
//! - The Task entity with content-derived identity, contexts and tags
//! - The single-running-task state machine over a small persisted record
//! - The append-only history log and its query/grouping engine
//! - Flexible date/time parsing and duration formatting
//! - CLI command parsing and report rendering
//!
//! # Example
//!
//! ```no_run
//! use letsdo::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod utils;
