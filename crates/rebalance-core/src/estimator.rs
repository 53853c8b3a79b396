use crate::error::{RebalanceError, RebalanceResult};
use crate::matrix::Matrix;

/// Trait for supervised classifiers over integer class codes.
///
/// `Clone` gives an unfitted copy with the same hyper-parameters, which is
/// how cross-validation refits a model per fold.
pub trait Classifier: Clone + Send + Sync {
    fn fit(&mut self, x: &Matrix, y: &[usize]) -> RebalanceResult<()>;
    fn predict(&self, x: &Matrix) -> RebalanceResult<Vec<usize>>;

    /// Short human-readable estimator name.
    fn name(&self) -> &'static str;

    /// Mean accuracy on the given data.
    fn score(&self, x: &Matrix, y: &[usize]) -> RebalanceResult<f64> {
        if x.rows() != y.len() {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![x.rows()],
                got: vec![y.len()],
            });
        }
        if y.is_empty() {
            return Err(RebalanceError::EmptyInput("score on zero samples".into()));
        }
        let pred = self.predict(x)?;
        let correct = pred.iter().zip(y).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }
}

/// Check that a feature matrix and label vector describe the same samples.
pub fn check_xy(x: &Matrix, y: &[usize]) -> RebalanceResult<()> {
    if x.rows() != y.len() {
        return Err(RebalanceError::ShapeMismatch {
            expected: vec![x.rows()],
            got: vec![y.len()],
        });
    }
    if y.is_empty() {
        return Err(RebalanceError::EmptyInput("no training samples".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Constant(usize);

    impl Classifier for Constant {
        fn fit(&mut self, _x: &Matrix, _y: &[usize]) -> RebalanceResult<()> {
            Ok(())
        }
        fn predict(&self, x: &Matrix) -> RebalanceResult<Vec<usize>> {
            Ok(vec![self.0; x.rows()])
        }
        fn name(&self) -> &'static str {
            "constant"
        }
    }

    #[test]
    fn test_default_score_is_accuracy() {
        let x = Matrix::zeros(4, 1);
        let score = Constant(0).score(&x, &[0, 0, 0, 1]).unwrap();
        assert!((score - 0.75).abs() < 1e-12);
        assert!(Constant(0).score(&x, &[0]).is_err());
    }

    #[test]
    fn test_check_xy() {
        assert!(check_xy(&Matrix::zeros(2, 1), &[0, 1]).is_ok());
        assert!(check_xy(&Matrix::zeros(0, 1), &[]).is_err());
    }
}
