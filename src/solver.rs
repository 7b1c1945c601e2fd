//! Dense Gauss-Jordan elimination with partial pivoting.

use nalgebra::{DMatrix, DVector};
use tracing::trace;

use crate::errors::SolverError;

/// Solve `matrix * x = rhs` for `x`.
///
/// For each column the row with the largest remaining magnitude is swapped
/// into pivot position, normalised, and eliminated from every other row. Entries
/// of the solution smaller than `tolerance` are returned as exactly zero.
///
/// # Errors
///
/// Returns [`SolverError::DimensionMismatch`] when the system is empty or not
/// square, and [`SolverError::Singular`] as soon as the best available pivot is
/// smaller than `tolerance`.
///
/// # Examples
/// ```
/// use bridgestat::solve_linear_system;
/// use nalgebra::{DMatrix, DVector};
///
/// let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
/// let b = DVector::from_vec(vec![5.0, 10.0]);
/// let x = solve_linear_system(&a, &b, 1.0e-9).expect("regular system");
/// assert!((x[0] - 1.0).abs() < 1.0e-12);
/// assert!((x[1] - 3.0).abs() < 1.0e-12);
/// ```
pub fn solve_linear_system(
    matrix: &DMatrix<f64>,
    rhs: &DVector<f64>,
    tolerance: f64,
) -> Result<DVector<f64>, SolverError> {
    let n = matrix.nrows();
    if n == 0 || matrix.ncols() != n || rhs.len() != n {
        return Err(SolverError::DimensionMismatch {
            rows: n,
            columns: matrix.ncols(),
            rhs: rhs.len(),
        });
    }

    let mut a = matrix.clone();
    let mut b = rhs.clone();

    for column in 0..n {
        let (offset, pivot) = a
            .view((column, column), (n - column, 1))
            .iter()
            .map(|value| value.abs())
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (row, value)| {
                if value > best.1 {
                    (row, value)
                } else {
                    best
                }
            });
        let pivot_row = column + offset;
        if pivot_row != column {
            a.swap_rows(column, pivot_row);
            b.swap_rows(column, pivot_row);
        }
        if pivot < tolerance {
            trace!(column, pivot, "rejecting pivot");
            return Err(SolverError::Singular { column, pivot });
        }

        let scale = a[(column, column)];
        for j in column..n {
            a[(column, j)] /= scale;
        }
        b[column] /= scale;

        for row in 0..n {
            if row == column {
                continue;
            }
            let factor = a[(row, column)];
            if factor == 0.0 {
                continue;
            }
            for j in column..n {
                a[(row, j)] -= factor * a[(column, j)];
            }
            b[row] -= factor * b[column];
        }
    }

    b.apply(|value| {
        if value.abs() < tolerance {
            *value = 0.0;
        }
    });
    Ok(b)
}
