//! Command-line front end for visit completeness reports.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
