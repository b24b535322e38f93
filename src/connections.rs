use crate::matrix::Matrix;

/// Signed connection strength split into a positive and a negative channel.
/// At most one channel is non-zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Activation {
    pub positive: f32,
    pub negative: f32,
}

impl Activation {
    pub fn from_weight(weight: f32) -> Self {
        if weight > 0.0 {
            Self {
                positive: weight,
                negative: 0.0,
            }
        } else {
            Self {
                positive: 0.0,
                negative: -weight,
            }
        }
    }

    pub fn magnitude(&self) -> f32 {
        self.positive.max(self.negative)
    }
}

/// One cell of the connection grid: a first layer unit feeding a second
/// layer unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    /// Index of the first layer unit, also the index of its feature image.
    pub unit: usize,
    /// Weight normalized by the column's largest magnitude.
    pub weight: f32,
    pub activation: Activation,
}

/// Normalizes `column` so its largest magnitude is 1 and returns the `count`
/// strongest entries, strongest first. Equal magnitudes rank the higher unit
/// index first.
pub fn top_connections(column: &[f32], count: usize) -> Vec<Connection> {
    let max = column.iter().fold(0.0_f32, |m, w| m.max(w.abs()));
    let scale = if max > 0.0 { max.recip() } else { 0.0 };

    let mut ranked: Vec<(usize, f32)> = column
        .iter()
        .enumerate()
        .map(|(unit, &w)| (unit, w * scale))
        .collect();

    ranked.sort_by(|(ia, wa), (ib, wb)| {
        wb.abs()
            .total_cmp(&wa.abs())
            .then(ib.cmp(ia))
    });

    ranked
        .into_iter()
        .take(count)
        .map(|(unit, weight)| Connection {
            unit,
            weight,
            activation: Activation::from_weight(weight),
        })
        .collect()
}

/// Builds the connection grid for the first `rows` columns of an already
/// norm-sorted `w2`, `count` cells per row.
pub fn connection_grid(w2: &Matrix, rows: usize, count: usize) -> Vec<Vec<Connection>> {
    (0..rows.min(w2.cols()))
        .map(|i| top_connections(&w2.column(i), count))
        .collect()
}
