use rebalance_core::{check_xy, Classifier, Matrix, RebalanceError, RebalanceResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::decision_tree::{argmax_rows, DecisionTreeClassifier, MaxFeatures};

/// Random Forest Classifier: an ensemble of decision trees with bagging.
///
/// Every tree draws its bootstrap sample and split features from its own
/// seed, derived up front from the forest seed, so trees can be fitted in
/// parallel and still give the same forest for the same seed.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: Option<u64>,
    trees: Vec<DecisionTreeClassifier>,
    n_classes: usize,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize, max_depth: usize, seed: Option<u64>) -> Self {
        RandomForestClassifier {
            n_estimators,
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed,
            trees: Vec::new(),
            n_classes: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean of the per-tree class probabilities.
    pub fn predict_proba(&self, x: &Matrix) -> RebalanceResult<Matrix> {
        if self.trees.is_empty() {
            return Err(RebalanceError::NotFitted("RandomForestClassifier"));
        }
        let mut sum = vec![0.0; x.rows() * self.n_classes];
        for tree in &self.trees {
            let proba = tree.predict_proba(x)?;
            for (s, p) in sum.iter_mut().zip(proba.data()) {
                *s += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        sum.iter_mut().for_each(|s| *s /= n_trees);
        Matrix::new(sum, x.rows(), self.n_classes)
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        RandomForestClassifier::new(12, 7, None)
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, x: &Matrix, y: &[usize]) -> RebalanceResult<()> {
        check_xy(x, y)?;
        if self.n_estimators == 0 {
            return Err(RebalanceError::InvalidParameter(
                "n_estimators must be at least 1".into(),
            ));
        }
        let n = y.len();
        self.n_classes = rebalance_core::n_classes(y);

        let mut base_rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let tree_seeds: Vec<u64> = (0..self.n_estimators).map(|_| base_rng.gen()).collect();

        let template = DecisionTreeClassifier::new(
            self.max_depth,
            self.min_samples_split,
            self.min_samples_leaf,
        );
        let n_classes = self.n_classes;
        let bootstrap = self.bootstrap;
        let max_features = self.max_features;

        let trees = tree_seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                // Bootstrap sample
                let sample: Vec<usize> = if bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                let mut tree = template
                    .clone()
                    .with_max_features(max_features, Some(rng.gen()));
                tree.fit_sample(x, y, &sample, n_classes)?;
                Ok(tree)
            })
            .collect::<RebalanceResult<Vec<_>>>()?;

        debug!(
            trees = trees.len(),
            max_depth = self.max_depth,
            samples = n,
            "fitted random forest"
        );
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> RebalanceResult<Vec<usize>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    fn name(&self) -> &'static str {
        "random-forest"
    }
}
