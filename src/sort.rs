use log::info;

use crate::matrix::Matrix;

/// Returns a copy of `w2` with its columns ordered by descending squared norm.
///
/// Ties keep their original relative order.
pub fn sort_by_column_norm(w2: &Matrix) -> Matrix {
    info!("Sorting so largest-norm layer 2 weights are plotted at the top");

    let norms = w2.column_sq_norms();
    let mut order: Vec<usize> = (0..norms.len()).collect();

    order.sort_by(|&a, &b| norms[b].total_cmp(&norms[a]).then(a.cmp(&b)));

    w2.select_columns(&order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_larger_norm_first() {
        let w2 = Matrix::from_rows(&[[1.0, 0.0], [0.0, 2.0], [0.5, 0.0]]);

        let sorted = sort_by_column_norm(&w2);

        assert_eq!(
            sorted,
            Matrix::from_rows(&[[0.0, 1.0], [2.0, 0.0], [0.0, 0.5]])
        );
        // input untouched
        assert_eq!(w2.column(0), vec![1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_is_column_permutation_with_nonincreasing_norms() {
        let w2 = Matrix::from_fn(7, 9, |i, j| ((i * 31 + j * 17) % 11) as f32 - 5.0);

        let sorted = sort_by_column_norm(&w2);

        let norms = sorted.column_sq_norms();
        assert!(norms.windows(2).all(|w| w[0] >= w[1]));

        let mut before: Vec<Vec<f32>> = (0..w2.cols()).map(|j| w2.column(j)).collect();
        let mut after: Vec<Vec<f32>> = (0..sorted.cols()).map(|j| sorted.column(j)).collect();
        before.sort_by(|a, b| a.partial_cmp(b).unwrap());
        after.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(before, after);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let w2 = Matrix::from_rows(&[[1.0, -1.0, 0.0, 2.0], [0.0, 0.0, 1.0, 0.0]]);

        let sorted = sort_by_column_norm(&w2);

        assert_eq!(sorted.column(0), vec![2.0, 0.0]);
        assert_eq!(sorted.column(1), vec![1.0, 0.0]);
        assert_eq!(sorted.column(2), vec![-1.0, 0.0]);
        assert_eq!(sorted.column(3), vec![0.0, 1.0]);
    }
}
