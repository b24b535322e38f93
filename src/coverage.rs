use log::debug;

use crate::matrix::Matrix;

pub const DEFAULT_THRESHOLD: f32 = 0.9;
pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_MAX_ROWS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverageConfig {
    /// Fraction of a unit's absolute weight mass the shown elements must reach.
    pub threshold: f32,
    /// Upper bound on the number of elements shown per row.
    pub limit: usize,
    /// Upper bound on the number of second layer units considered.
    pub max_rows: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoverageReport {
    /// Elements needed by each considered column, in column order.
    pub per_column: Vec<usize>,
    pub max_needed: usize,
    pub average_needed: f32,
    /// Uniform number of elements shown in every row.
    pub count: usize,
    /// Whether `count` was cut down by the configured limit.
    pub truncated: bool,
}

/// Smallest number of largest-magnitude entries whose absolute values sum to
/// at least `threshold` of the column's total absolute mass.
///
/// An all-zero (or empty) column needs exactly one element.
pub fn elements_needed(column: &[f32], threshold: f32) -> usize {
    let mut mags: Vec<f32> = column.iter().map(|w| w.abs()).collect();
    let total: f32 = mags.iter().sum();

    if mags.is_empty() || total <= 0.0 {
        return 1;
    }

    mags.sort_by(|a, b| b.total_cmp(a));

    let target = threshold * total;
    let mut partial = mags[0];
    let mut count = 1;

    while partial < target && count < mags.len() {
        partial += mags[count];
        count += 1;
    }

    count
}

/// Picks one display width shared by every row of the connection grid: the
/// largest per-column requirement over the first `config.max_rows` columns,
/// capped by `config.limit` and by `n1`.
pub fn select_count(w2: &Matrix, n1: usize, config: &CoverageConfig) -> CoverageReport {
    let rows = w2.cols().min(config.max_rows);

    let per_column: Vec<usize> = (0..rows)
        .map(|i| elements_needed(&w2.column(i), config.threshold))
        .collect();

    let max_needed = per_column.iter().copied().max().unwrap_or(0);
    let average_needed = if rows == 0 {
        0.0
    } else {
        per_column.iter().sum::<usize>() as f32 / rows as f32
    };

    debug!("elements needed per column: {per_column:?}");

    let truncated = max_needed > config.limit;
    let count = max_needed.min(config.limit).min(n1);

    CoverageReport {
        per_column,
        max_needed,
        average_needed,
        count,
        truncated,
    }
}
