//! Window resolution, series alignment and recession tagging.

pub mod aligner;
pub mod recession;
pub mod window;

pub use aligner::Aligner;
pub use recession::{RecessionInterval, RecessionTable, ShadedRegion};
pub use window::resolve_window;
