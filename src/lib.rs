//! honeycomb-cleaner
//!
//! Find datasets and columns in a Honeycomb environment that have not
//! received data for a while, report them, and optionally delete them.

pub mod activity;
pub mod api;
pub mod app;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod utils;

pub use error::{CleanerError, Result};
