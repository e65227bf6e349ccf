//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - effective rate observations: `*`
//! - target rate (point or range midpoint): `-` line
//! - recession columns: `.` background

use chrono::NaiveDate;

use crate::domain::{AlignedRow, AlignedTable};

/// Render the aligned table as a text plot.
pub fn render_ascii_plot(table: &AlignedTable, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let rows = table.rows();

    let (d_min, d_max) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => (table.window().beg, table.window().end),
    };
    let t_max = day_offset(d_max, d_min).max(1.0);

    let (y_min, y_max) = y_range(rows).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Shade recession columns first so lines and points draw over them.
    for r in rows.iter().filter(|r| r.in_recession) {
        let x = map_x(day_offset(r.date, d_min), t_max, width);
        for line in grid.iter_mut() {
            line[x] = '.';
        }
    }

    // Target line, broken where the target is missing.
    let mut prev: Option<(usize, usize)> = None;
    for r in rows {
        let Some(y) = r.target_rate() else {
            prev = None;
            continue;
        };
        let x = map_x(day_offset(r.date, d_min), t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, yy, '-'),
            None => grid[yy][x] = '-',
        }
        prev = Some((x, yy));
    }

    for r in rows {
        if let Some(y) = r.effective_rate {
            let x = map_x(day_offset(r.date, d_min), t_max, width);
            grid[map_y(y, y_min, y_max, height)][x] = '*';
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{d_min}, {d_max}] | rate=[{y_min:.2}, {y_max:.2}]%\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day_offset(date: NaiveDate, origin: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

fn y_range(rows: &[AlignedRow]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for y in rows
        .iter()
        .flat_map(|r| [r.effective_rate, r.target_rate()])
        .flatten()
    {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: center it in a one-point band.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (t / t_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only blank or shaded cells are written.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == '.' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Target, Window};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let table = AlignedTable::new(
            Window {
                beg: date(2020, 1, 1),
                end: date(2020, 1, 10),
            },
            vec![
                AlignedRow {
                    date: date(2020, 1, 1),
                    effective_rate: Some(1.0),
                    target: Some(Target::Point(1.0)),
                    in_recession: false,
                },
                AlignedRow {
                    date: date(2020, 1, 10),
                    effective_rate: Some(2.0),
                    target: Some(Target::Point(1.0)),
                    in_recession: true,
                },
            ],
        )
        .unwrap();

        let txt = render_ascii_plot(&table, 10, 5);
        let expected = concat!(
            "Plot: date=[2020-01-01, 2020-01-10] | rate=[0.95, 2.05]%\n",
            "         *\n",
            "         .\n",
            "         .\n",
            "         .\n",
            "*---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_single_row_still_renders() {
        let table = AlignedTable::new(
            Window {
                beg: date(2008, 12, 1),
                end: date(2008, 12, 31),
            },
            vec![AlignedRow {
                date: date(2008, 12, 16),
                effective_rate: Some(0.16),
                target: None,
                in_recession: false,
            }],
        )
        .unwrap();

        let txt = render_ascii_plot(&table, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "*         ");
    }
}
