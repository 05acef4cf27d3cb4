//! `dip-calc` library crate.
//!
//! The binary (`dip`) is a thin wrapper around this library so that:
//!
//! - the metrics engine and catalog lookup are testable without spawning processes
//! - the CLI and the TUI share one calculation pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod debug;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
