//! Dense linear algebra kernel
//!
//! Small, dependency-light routines used by the LIME surrogate fit:
//! - Matrix transpose and products with shape checking
//! - Gaussian elimination with partial pivoting
//! - Ridge (Tikhonov) regularization of normal-equation matrices

use crate::error::{ExplainError, Result};
use ndarray::{Array1, Array2};

/// Pivots with smaller magnitude than this are treated as zero
pub const PIVOT_EPSILON: f64 = 1e-12;

/// Transpose a matrix
pub fn transpose(m: &Array2<f64>) -> Array2<f64> {
    let (rows, cols) = m.dim();
    let mut out = Array2::zeros((cols, rows));
    for i in 0..rows {
        for j in 0..cols {
            out[[j, i]] = m[[i, j]];
        }
    }
    out
}

/// Matrix product `a * b`
pub fn multiply(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>> {
    if a.ncols() != b.nrows() {
        return Err(ExplainError::ShapeError {
            expected: format!("rhs with {} rows", a.ncols()),
            actual: format!("{} rows", b.nrows()),
        });
    }
    Ok(a.dot(b))
}

/// Matrix-vector product `a * v`
pub fn mat_vec_multiply(a: &Array2<f64>, v: &Array1<f64>) -> Result<Array1<f64>> {
    if a.ncols() != v.len() {
        return Err(ExplainError::ShapeError {
            expected: format!("vector of length {}", a.ncols()),
            actual: format!("length {}", v.len()),
        });
    }
    Ok(a.dot(v))
}

/// Solve `a x = b` for square `a` by Gaussian elimination with partial pivoting.
///
/// Returns [`ExplainError::NumericDegeneracy`] when the best available pivot of
/// a column is below [`PIVOT_EPSILON`] rather than dividing by it.
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(ExplainError::ShapeError {
            expected: "square matrix".to_string(),
            actual: format!("{}x{}", a.nrows(), a.ncols()),
        });
    }
    if b.len() != n {
        return Err(ExplainError::ShapeError {
            expected: format!("rhs of length {}", n),
            actual: format!("length {}", b.len()),
        });
    }

    // Augmented matrix [A | b]
    let mut aug = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        // Find pivot
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in col..=n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }

        let pivot = aug[[col, col]];
        if pivot.is_nan() || pivot.abs() < PIVOT_EPSILON {
            return Err(ExplainError::NumericDegeneracy { column: col, pivot });
        }

        // Eliminate below the pivot
        for row in col + 1..n {
            let factor = aug[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in col..=n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    // Back substitution
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += aug[[i, j]] * x[j];
        }
        x[i] = (aug[[i, n]] - sum) / aug[[i, i]];
    }

    Ok(x)
}

/// Add `lambda` to the diagonal of a square matrix.
///
/// With `skip_last` the final diagonal entry (the bias term of an augmented
/// design) is left unpenalized.
pub fn add_ridge(a: &mut Array2<f64>, lambda: f64, skip_last: bool) {
    let n = a.nrows().min(a.ncols());
    let end = if skip_last { n.saturating_sub(1) } else { n };
    for i in 0..end {
        a[[i, i]] += lambda;
    }
}
