//! `fedfunds` library crate.
//!
//! The binary (`fedfunds`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or hitting the network
//! - the aligner, writers and renderers are reusable on their own

pub mod align;
pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
