//! Reporting utilities: table statistics and formatted terminal output.

use crate::domain::{AlignedTable, Target};

pub mod format;

pub use format::format_run_summary;

/// Row counts per regime, used by the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub rows: usize,
    pub point_rows: usize,
    pub range_rows: usize,
    pub no_target_rows: usize,
    pub recession_rows: usize,
}

/// Count rows by target regime and recession flag.
pub fn table_stats(table: &AlignedTable) -> TableStats {
    let mut stats = TableStats {
        rows: table.len(),
        ..TableStats::default()
    };
    for row in table.rows() {
        match row.target {
            Some(Target::Point(_)) => stats.point_rows += 1,
            Some(Target::Range { .. }) => stats.range_rows += 1,
            None => stats.no_target_rows += 1,
        }
        if row.in_recession {
            stats.recession_rows += 1;
        }
    }
    stats
}
