use rebalance_core::{Matrix, RebalanceError, RebalanceResult};

/// Solve `A x = b` for a symmetric positive-definite `A` via Cholesky
/// (`A = L Lᵀ`), then forward and back substitution.
pub fn cholesky_solve(a: &Matrix, b: &[f64]) -> RebalanceResult<Vec<f64>> {
    let n = a.rows();
    if a.cols() != n {
        return Err(RebalanceError::InvalidParameter(
            "cholesky_solve: A must be square".into(),
        ));
    }
    if b.len() != n {
        return Err(RebalanceError::ShapeMismatch {
            expected: vec![n],
            got: vec![b.len()],
        });
    }

    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a.row(i)[j];
            for k in 0..j {
                sum -= l[i * n + k] * l[j * n + k];
            }
            if i == j {
                if sum <= 0.0 {
                    return Err(RebalanceError::SingularMatrix);
                }
                l[i * n + i] = sum.sqrt();
            } else {
                l[i * n + j] = sum / l[j * n + j];
            }
        }
    }

    // Forward substitution: L * z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|k| l[i * n + k] * z[k]).sum();
        z[i] = (b[i] - sum) / l[i * n + i];
    }

    // Back substitution: Lᵀ * x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|k| l[k * n + i] * x[k]).sum();
        x[i] = (z[i] - sum) / l[i * n + i];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cholesky_solve() {
        // 4x + 2y = 10
        // 2x + 3y = 9
        // Solution: x=1.5, y=2
        let a = Matrix::new(vec![4.0, 2.0, 2.0, 3.0], 2, 2).unwrap();
        let x = cholesky_solve(&a, &[10.0, 9.0]).unwrap();
        assert!((x[0] - 1.5).abs() < 1e-10);
        assert!((x[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_not_positive_definite() {
        let a = Matrix::new(vec![1.0, 2.0, 2.0, 1.0], 2, 2).unwrap();
        assert!(matches!(
            cholesky_solve(&a, &[1.0, 1.0]),
            Err(RebalanceError::SingularMatrix)
        ));
    }
}
