//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw observations and series (`RawPoint`, `RawSeries`, `RangeSeries`)
//! - the dual-regime target (`Target`)
//! - aligned output (`AlignedRow`, `AlignedTable`, `Window`)
//! - run configuration (`DateBound`, `Source`, `RunConfig`)

pub mod types;

pub use types::*;
