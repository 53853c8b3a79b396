use rebalance_core::{check_xy, class_counts, Classifier, Matrix, RebalanceError, RebalanceResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

/// Stratified k-fold splitter: every fold keeps roughly the class
/// proportions of the whole label vector.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        StratifiedKFold {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = Some(seed);
        self
    }

    /// Produce `(train_indices, test_indices)` for each fold.
    ///
    /// Members of each class are dealt round-robin across folds, continuing
    /// the rotation from one class to the next so fold sizes differ by at
    /// most one.
    pub fn split(&self, y: &[usize]) -> RebalanceResult<Vec<(Vec<usize>, Vec<usize>)>> {
        let k = self.n_splits;
        if k < 2 {
            return Err(RebalanceError::InvalidParameter(format!(
                "n_splits must be at least 2, got {k}"
            )));
        }
        if k > y.len() {
            return Err(RebalanceError::InvalidParameter(format!(
                "n_splits={k} exceeds the number of samples ({})",
                y.len()
            )));
        }

        let counts = class_counts(y);
        if let Some((&class, &smallest)) = counts.iter().min_by_key(|(_, n)| **n) {
            if smallest < k {
                warn!(
                    class,
                    members = smallest,
                    n_splits = k,
                    "least populated class has fewer members than folds"
                );
            }
        }

        let mut rng = match (self.shuffle, self.seed) {
            (true, Some(s)) => Some(StdRng::seed_from_u64(s)),
            (true, None) => Some(StdRng::from_entropy()),
            (false, _) => None,
        };

        let mut fold_of = vec![0usize; y.len()];
        let mut next_fold = 0;
        for &class in counts.keys() {
            let mut members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            if let Some(rng) = rng.as_mut() {
                members.shuffle(rng);
            }
            for i in members {
                fold_of[i] = next_fold;
                next_fold = (next_fold + 1) % k;
            }
        }

        Ok((0..k)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..y.len()).partition(|&i| fold_of[i] == fold);
                (train, test)
            })
            .collect())
    }
}

/// Evaluate a classifier by cross-validation, returning per-fold accuracy.
///
/// A fresh clone of `model` is fitted for every fold.
pub fn cross_val_score<C: Classifier>(
    model: &C,
    x: &Matrix,
    y: &[usize],
    cv: &StratifiedKFold,
) -> RebalanceResult<Vec<f64>> {
    check_xy(x, y)?;
    let mut scores = Vec::with_capacity(cv.n_splits);
    for (fold, (train, test)) in cv.split(y)?.into_iter().enumerate() {
        let mut est = model.clone();
        let x_train = x.select_rows(&train)?;
        let y_train: Vec<usize> = train.iter().map(|&i| y[i]).collect();
        est.fit(&x_train, &y_train)?;

        let x_test = x.select_rows(&test)?;
        let y_test: Vec<usize> = test.iter().map(|&i| y[i]).collect();
        let score = est.score(&x_test, &y_test)?;
        debug!(estimator = est.name(), fold, score, "cross-validation fold");
        scores.push(score);
    }
    Ok(scores)
}

/// Arithmetic mean of fold scores.
pub fn mean_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Majority(usize);

    impl Classifier for Majority {
        fn fit(&mut self, _x: &Matrix, y: &[usize]) -> RebalanceResult<()> {
            let counts = class_counts(y);
            self.0 = rebalance_core::majority_class(&counts).unwrap_or(0);
            Ok(())
        }
        fn predict(&self, x: &Matrix) -> RebalanceResult<Vec<usize>> {
            Ok(vec![self.0; x.rows()])
        }
        fn name(&self) -> &'static str {
            "majority"
        }
    }

    #[test]
    fn test_folds_partition_and_stratify() {
        let y: Vec<usize> = (0..100).map(|i| usize::from(i % 10 == 0)).collect();
        let folds = StratifiedKFold::new(5).split(&y).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = vec![0usize; 100];
        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), 100);
            assert_eq!(test.len(), 20);
            let positives = test.iter().filter(|&&i| y[i] == 1).count();
            assert_eq!(positives, 2);
            for &i in test {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_shuffled_folds_are_seeded() {
        let y: Vec<usize> = (0..30).map(|i| i % 3).collect();
        let a = StratifiedKFold::new(3).with_shuffle(9).split(&y).unwrap();
        let b = StratifiedKFold::new(3).with_shuffle(9).split(&y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_fold_counts() {
        assert!(StratifiedKFold::new(1).split(&[0, 1]).is_err());
        assert!(StratifiedKFold::new(5).split(&[0, 1, 0]).is_err());
    }

    #[test]
    fn test_cross_val_score_majority_baseline() {
        let y: Vec<usize> = (0..50).map(|i| usize::from(i % 5 == 0)).collect();
        let x = Matrix::zeros(50, 1);
        let scores = cross_val_score(&Majority(0), &x, &y, &StratifiedKFold::new(5)).unwrap();
        assert_eq!(scores.len(), 5);
        assert!((mean_score(&scores) - 0.8).abs() < 1e-12);
    }
}
