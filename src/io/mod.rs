//! Input/output helpers.
//!
//! - atomic file writes (`atomic`)
//! - aligned table CSV export and re-read (`export`)

pub mod atomic;
pub mod export;

pub use atomic::*;
pub use export::*;
