use rebalance_core::{check_xy, Classifier, Matrix, RebalanceError, RebalanceResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::solve::cholesky_solve;

/// Optimizer used by [`LogisticRegression::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogisticSolver {
    /// Newton–Raphson (IRLS) with backtracking; converges in a handful of
    /// iterations on small dense problems.
    Newton,
    /// Plain full-batch gradient descent.
    GradientDescent { learning_rate: f64 },
}

/// Logistic Regression: binary classification with an L2 penalty.
///
/// Minimizes `0.5·|w|² + C·Σ log-loss`; the intercept is not penalized.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub solver: LogisticSolver,
    pub weights: Option<Vec<f64>>,
    pub bias: Option<f64>,
    pub n_iter: usize,
}

impl LogisticRegression {
    pub fn new(c: f64, max_iter: usize) -> Self {
        LogisticRegression {
            c,
            max_iter,
            tol: 1e-6,
            solver: LogisticSolver::Newton,
            weights: None,
            bias: None,
            n_iter: 0,
        }
    }

    pub fn with_solver(mut self, solver: LogisticSolver) -> Self {
        self.solver = solver;
        self
    }

    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let e = z.exp();
            e / (1.0 + e)
        }
    }

    fn linear(theta: &[f64], row: &[f64]) -> f64 {
        let p = row.len();
        theta[p] + row.iter().zip(theta).map(|(x, w)| x * w).sum::<f64>()
    }

    /// Penalized objective, scaled by 1/C.
    fn objective(&self, x: &Matrix, y: &[f64], theta: &[f64]) -> f64 {
        let p = x.cols();
        let penalty: f64 = theta[..p].iter().map(|w| w * w).sum::<f64>() / (2.0 * self.c);
        let loss: f64 = x
            .iter_rows()
            .zip(y)
            .map(|(row, &yi)| {
                let z = Self::linear(theta, row);
                // log(1 + e^z) - y·z, stable for large |z|
                let softplus = if z > 0.0 {
                    z + (-z).exp().ln_1p()
                } else {
                    z.exp().ln_1p()
                };
                softplus - yi * z
            })
            .sum();
        loss + penalty
    }

    fn gradient(&self, x: &Matrix, y: &[f64], theta: &[f64]) -> Vec<f64> {
        let p = x.cols();
        let mut g = vec![0.0; p + 1];
        for (row, &yi) in x.iter_rows().zip(y) {
            let err = Self::sigmoid(Self::linear(theta, row)) - yi;
            for (gj, xj) in g.iter_mut().zip(row) {
                *gj += err * xj;
            }
            g[p] += err;
        }
        for j in 0..p {
            g[j] += theta[j] / self.c;
        }
        g
    }

    fn hessian(&self, x: &Matrix, theta: &[f64]) -> RebalanceResult<Matrix> {
        let p = x.cols();
        let d = p + 1;
        let mut h = vec![0.0; d * d];
        let mut xt = vec![1.0; d];
        for row in x.iter_rows() {
            let s = Self::sigmoid(Self::linear(theta, row));
            let w = s * (1.0 - s);
            xt[..p].copy_from_slice(row);
            for a in 0..d {
                for b in 0..=a {
                    h[a * d + b] += w * xt[a] * xt[b];
                }
            }
        }
        for a in 0..d {
            for b in 0..a {
                h[b * d + a] = h[a * d + b];
            }
        }
        for j in 0..p {
            h[j * d + j] += 1.0 / self.c;
        }
        // keeps the intercept pivot positive on separable data
        h[p * d + p] += 1e-10;
        Matrix::new(h, d, d)
    }

    /// Backtracking: halve the step until the objective does not increase.
    /// `None` when even a tiny step makes it worse.
    fn line_search(
        &self,
        x: &Matrix,
        y: &[f64],
        theta: &[f64],
        step: &[f64],
        current: f64,
    ) -> Option<(Vec<f64>, f64, f64)> {
        let mut t = 1.0;
        while t >= 1e-8 {
            let candidate: Vec<f64> = theta.iter().zip(step).map(|(th, s)| th - t * s).collect();
            let value = self.objective(x, y, &candidate);
            if value <= current {
                return Some((candidate, value, t));
            }
            t *= 0.5;
        }
        None
    }

    fn fit_newton(&mut self, x: &Matrix, y: &[f64]) -> RebalanceResult<Vec<f64>> {
        let mut theta = vec![0.0; x.cols() + 1];
        let mut current = self.objective(x, y, &theta);

        for iter in 0..self.max_iter {
            self.n_iter = iter + 1;
            let g = self.gradient(x, y, &theta);
            let h = self.hessian(x, &theta)?;
            let step = cholesky_solve(&h, &g)?;

            let Some((candidate, value, t)) = self.line_search(x, y, &theta, &step, current) else {
                debug!(iter, "no decreasing step, stopping");
                break;
            };

            let max_step = step.iter().fold(0.0_f64, |m, s| m.max((t * s).abs()));
            theta = candidate;
            current = value;
            if max_step < self.tol {
                break;
            }
        }
        Ok(theta)
    }

    fn fit_gradient_descent(&mut self, x: &Matrix, y: &[f64], learning_rate: f64) -> Vec<f64> {
        let n = x.rows() as f64;
        let mut theta = vec![0.0; x.cols() + 1];

        for iter in 0..self.max_iter {
            self.n_iter = iter + 1;
            let g = self.gradient(x, y, &theta);

            // Update weights
            let mut max_grad = 0.0_f64;
            for (th, gj) in theta.iter_mut().zip(&g) {
                let grad = gj / n;
                *th -= learning_rate * grad;
                max_grad = max_grad.max(grad.abs());
            }

            if max_grad < self.tol {
                break;
            }
        }
        theta
    }

    /// Predict probabilities of the positive class (code 1).
    pub fn predict_proba(&self, x: &Matrix) -> RebalanceResult<Vec<f64>> {
        let w = self
            .weights
            .as_ref()
            .ok_or(RebalanceError::NotFitted("LogisticRegression"))?;
        if x.cols() != w.len() {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![w.len()],
                got: vec![x.cols()],
            });
        }
        let b = self.bias.unwrap_or(0.0);
        Ok(x
            .iter_rows()
            .map(|row| {
                let z = b + row.iter().zip(w).map(|(xi, wi)| xi * wi).sum::<f64>();
                Self::sigmoid(z)
            })
            .collect())
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        LogisticRegression::new(1.0, 100)
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Matrix, y: &[usize]) -> RebalanceResult<()> {
        check_xy(x, y)?;
        if self.c <= 0.0 {
            return Err(RebalanceError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.c
            )));
        }
        if let Some(&bad) = y.iter().find(|&&c| c > 1) {
            return Err(RebalanceError::InvalidParameter(format!(
                "logistic regression is binary; got class code {bad}"
            )));
        }
        let y_f: Vec<f64> = y.iter().map(|&c| c as f64).collect();

        let theta = match self.solver {
            LogisticSolver::Newton => self.fit_newton(x, &y_f)?,
            LogisticSolver::GradientDescent { learning_rate } => {
                self.fit_gradient_descent(x, &y_f, learning_rate)
            }
        };

        let p = x.cols();
        debug!(
            solver = ?self.solver,
            iterations = self.n_iter,
            samples = x.rows(),
            "fitted logistic regression"
        );
        self.bias = Some(theta[p]);
        self.weights = Some(theta[..p].to_vec());
        Ok(())
    }

    /// Predict class labels (threshold = 0.5).
    fn predict(&self, x: &Matrix) -> RebalanceResult<Vec<usize>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| usize::from(p >= 0.5))
            .collect())
    }

    fn name(&self) -> &'static str {
        "logistic-regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn separable() -> (Matrix, Vec<usize>) {
        // Linearly separable data
        let x = Matrix::from_rows(&[
            vec![0.0, 0.0],
            vec![0.5, 0.5],
            vec![1.0, 1.0],
            vec![5.0, 5.0],
            vec![5.5, 5.5],
            vec![6.0, 6.0],
        ])
        .unwrap();
        (x, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn test_line_search_rejects_uphill_steps() {
        let (x, y) = separable();
        let y: Vec<f64> = y.iter().map(|&v| v as f64).collect();
        let model = LogisticRegression::default();
        let theta = vec![0.0; 3];
        let current = model.objective(&x, &y, &theta);
        let g = model.gradient(&x, &y, &theta);

        // along the gradient the convex objective only grows
        let uphill: Vec<f64> = g.iter().map(|v| -v).collect();
        assert!(model.line_search(&x, &y, &theta, &uphill, current).is_none());

        let (candidate, value, t) = model.line_search(&x, &y, &theta, &g, current).unwrap();
        assert!(value <= current);
        assert!(t > 0.0 && t <= 1.0);
        assert_eq!(candidate.len(), 3);
    }

    #[test]
    fn test_newton_classifies_separable_data() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(model.n_iter < 100);
    }

    #[test]
    fn test_gradient_descent_classifies_separable_data() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(1.0, 2000)
            .with_solver(LogisticSolver::GradientDescent { learning_rate: 0.1 });
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_solvers_agree_on_overlapping_data() {
        let x = Matrix::from_rows(&[
            vec![0.0],
            vec![1.0],
            vec![2.0],
            vec![3.0],
            vec![1.5],
            vec![2.5],
            vec![3.5],
            vec![4.0],
        ])
        .unwrap();
        let y = vec![0, 0, 1, 0, 1, 1, 0, 1];

        let mut newton = LogisticRegression::default();
        newton.fit(&x, &y).unwrap();
        let mut gd = LogisticRegression::new(1.0, 200_000)
            .with_solver(LogisticSolver::GradientDescent { learning_rate: 0.5 });
        gd.tol = 1e-10;
        gd.fit(&x, &y).unwrap();

        let wn = newton.weights.as_ref().unwrap()[0];
        let wg = gd.weights.as_ref().unwrap()[0];
        assert_abs_diff_eq!(wn, wg, epsilon = 1e-4);
        assert_abs_diff_eq!(newton.bias.unwrap(), gd.bias.unwrap(), epsilon = 1e-4);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();
        for p in model.predict_proba(&x).unwrap() {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_rejects_multiclass_and_unfitted() {
        let (x, _) = separable();
        let mut model = LogisticRegression::default();
        assert!(model.fit(&x, &[0, 1, 2, 0, 1, 2]).is_err());
        assert!(matches!(
            LogisticRegression::default().predict(&x),
            Err(RebalanceError::NotFitted(_))
        ));
    }
}
