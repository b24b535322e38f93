use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// Composite receptive fields of the second layer: `(W1 · W2)ᵀ`, one row of
/// `D` input values per second layer unit.
pub fn composite_filters(w1: &Matrix, w2: &Matrix) -> Result<Matrix> {
    let prod = w1.dot(w2).ok_or(Error::ShapeMismatch {
        left_name: "W1",
        left: w1.shape(),
        right_name: "W2",
        right: w2.shape(),
    })?;

    Ok(prod.transpose())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_direct_product() {
        let w1 = Matrix::from_fn(4, 3, |i, j| if i == j { 1.0 } else { 0.0 });
        let w2 = Matrix::from_rows(&[[1.0, 0.0], [0.0, 2.0], [0.5, 0.0]]);

        let filters = composite_filters(&w1, &w2).unwrap();

        assert_eq!(filters.shape(), (2, 4));
        assert_eq!(filters.row(0), &[1.0, 0.0, 0.5, 0.0]);
        assert_eq!(filters.row(1), &[0.0, 2.0, 0.0, 0.0]);
        assert_eq!(filters, w1.dot(&w2).unwrap().transpose());
    }

    #[test]
    fn test_shape_mismatch_names_shapes() {
        let w1 = Matrix::zeroed(4, 3);
        let w2 = Matrix::zeroed(2, 2);

        let err = composite_filters(&w1, &w2).unwrap_err();

        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(err.to_string(), "cannot multiply W1 (4, 3) by W2 (2, 2)");
    }
}
