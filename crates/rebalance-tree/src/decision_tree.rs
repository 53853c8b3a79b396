use rebalance_core::{check_xy, Classifier, Matrix, RebalanceError, RebalanceResult};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// How many features a split may look at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaxFeatures {
    All,
    Sqrt,
    Log2,
    Count(usize),
}

impl MaxFeatures {
    /// Number of candidate features out of `n_features`, at least 1.
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// A node in the decision tree.
#[derive(Debug, Clone)]
enum TreeNode {
    /// Internal node: rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Leaf: class frequencies of the training rows that reached it.
    Leaf { proba: Vec<f64> },
}

/// Best split found for one node.
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Decision Tree Classifier using CART (Gini impurity).
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub seed: Option<u64>,
    root: Option<TreeNode>,
    n_classes: usize,
    n_features: usize,
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

impl DecisionTreeClassifier {
    pub fn new(max_depth: usize, min_samples_split: usize, min_samples_leaf: usize) -> Self {
        DecisionTreeClassifier {
            max_depth,
            min_samples_split,
            min_samples_leaf,
            max_features: MaxFeatures::All,
            seed: None,
            root: None,
            n_classes: 0,
            n_features: 0,
        }
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures, seed: Option<u64>) -> Self {
        self.max_features = max_features;
        self.seed = seed;
        self
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Depth of the fitted tree (a lone leaf has depth 0).
    pub fn depth(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map_or(0, walk)
    }

    /// Fit on the rows listed in `sample` (repeats allowed, as in a
    /// bootstrap), reserving probability slots for `n_classes` classes.
    pub(crate) fn fit_sample(
        &mut self,
        x: &Matrix,
        y: &[usize],
        sample: &[usize],
        n_classes: usize,
    ) -> RebalanceResult<()> {
        if sample.is_empty() {
            return Err(RebalanceError::EmptyInput("decision tree on zero samples".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(RebalanceError::InvalidParameter(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        self.n_classes = n_classes;
        self.n_features = x.cols();
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        self.root = Some(self.grow(x, y, sample.to_vec(), 0, &mut rng));
        Ok(())
    }

    fn class_counts(&self, y: &[usize], rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in rows {
            counts[y[i]] += 1;
        }
        counts
    }

    fn leaf(&self, counts: &[usize], n: usize) -> TreeNode {
        TreeNode::Leaf {
            proba: counts.iter().map(|&c| c as f64 / n as f64).collect(),
        }
    }

    fn grow(
        &self,
        x: &Matrix,
        y: &[usize],
        rows: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> TreeNode {
        let n = rows.len();
        let counts = self.class_counts(y, &rows);
        let node_impurity = gini(&counts, n);

        // Base cases
        if depth >= self.max_depth || n < self.min_samples_split || n < 2 || node_impurity == 0.0 {
            return self.leaf(&counts, n);
        }

        let best = match self.best_split(x, y, &rows, &counts, rng) {
            Some(best) if best.impurity < node_impurity => best,
            _ => return self.leaf(&counts, n),
        };

        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| x.row(i)[best.feature] <= best.threshold);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.grow(x, y, left, depth + 1, rng)),
            right: Box::new(self.grow(x, y, right, depth + 1, rng)),
        }
    }

    /// Sweep each candidate feature in sorted order, keeping running class
    /// counts on the left side.
    fn best_split(
        &self,
        x: &Matrix,
        y: &[usize],
        rows: &[usize],
        total: &[usize],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let p = self.n_features;
        let k = self.max_features.resolve(p);
        let features: Vec<usize> = if k < p {
            index::sample(rng, p, k).into_vec()
        } else {
            (0..p).collect()
        };

        let n = rows.len();
        let mut best: Option<SplitCandidate> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);

        for feature in features {
            sorted.clear();
            sorted.extend(rows.iter().map(|&i| (x.row(i)[feature], y[i])));
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0usize; self.n_classes];
            for pos in 0..n - 1 {
                left[sorted[pos].1] += 1;
                let (lo, hi) = (sorted[pos].0, sorted[pos + 1].0);
                if lo == hi {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }
                let right: Vec<usize> = total.iter().zip(&left).map(|(t, l)| t - l).collect();
                let impurity = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let mut threshold = (lo + hi) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }

    fn leaf_proba<'a>(node: &'a TreeNode, row: &[f64]) -> &'a [f64] {
        match node {
            TreeNode::Leaf { proba } => proba,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    Self::leaf_proba(left, row)
                } else {
                    Self::leaf_proba(right, row)
                }
            }
        }
    }

    /// Class probabilities, one row per sample and one column per class.
    pub fn predict_proba(&self, x: &Matrix) -> RebalanceResult<Matrix> {
        let root = self
            .root
            .as_ref()
            .ok_or(RebalanceError::NotFitted("DecisionTreeClassifier"))?;
        if x.cols() != self.n_features {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![x.rows(), self.n_features],
                got: vec![x.rows(), x.cols()],
            });
        }
        let mut data = Vec::with_capacity(x.rows() * self.n_classes);
        for row in x.iter_rows() {
            data.extend_from_slice(Self::leaf_proba(root, row));
        }
        Matrix::new(data, x.rows(), self.n_classes)
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        DecisionTreeClassifier::new(usize::MAX, 2, 1)
    }
}

/// Index of the largest probability in each row; ties go to the lower class.
pub(crate) fn argmax_rows(proba: &Matrix) -> Vec<usize> {
    proba
        .iter_rows()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (c, &p)| if p > best.1 { (c, p) } else { best })
                .0
        })
        .collect()
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, x: &Matrix, y: &[usize]) -> RebalanceResult<()> {
        check_xy(x, y)?;
        let all: Vec<usize> = (0..y.len()).collect();
        let n_classes = rebalance_core::n_classes(y);
        self.fit_sample(x, y, &all, n_classes)
    }

    fn predict(&self, x: &Matrix) -> RebalanceResult<Vec<usize>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    fn name(&self) -> &'static str {
        "decision-tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps() -> (Matrix, Vec<usize>) {
        let x = Matrix::from_rows(&[
            vec![0.0],
            vec![1.0],
            vec![2.0],
            vec![3.0],
            vec![4.0],
            vec![5.0],
            vec![6.0],
            vec![7.0],
        ])
        .unwrap();
        (x, vec![0, 0, 0, 0, 1, 1, 1, 1])
    }

    #[test]
    fn test_decision_tree_classifier() {
        let (x, y) = steps();
        let mut tree = DecisionTreeClassifier::new(10, 2, 1);
        tree.fit(&x, &y).unwrap();
        // Should get 100% accuracy on training data
        assert_eq!(tree.predict(&x).unwrap(), y);
        // one split at 3.5 separates the classes
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = Matrix::from_rows(&(0..16).map(|i| vec![i as f64]).collect::<Vec<_>>()).unwrap();
        let y: Vec<usize> = (0..16).map(|i| i % 2).collect();
        let mut tree = DecisionTreeClassifier::new(2, 2, 1);
        tree.fit(&x, &y).unwrap();
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let x = Matrix::from_rows(&[vec![0.0], vec![0.0], vec![0.0], vec![1.0]]).unwrap();
        let y = vec![0, 0, 1, 1];
        let mut tree = DecisionTreeClassifier::new(5, 2, 1);
        tree.fit(&x, &y).unwrap();
        let proba = tree.predict_proba(&x).unwrap();
        for row in proba.iter_rows() {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        // rows at 0.0 cannot be separated
        assert!((proba.get(0, 1).unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let (x, y) = steps();
        let mut tree = DecisionTreeClassifier::new(10, 2, 5);
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(8), 2);
        assert_eq!(MaxFeatures::Log2.resolve(8), 3);
        assert_eq!(MaxFeatures::All.resolve(8), 8);
        assert_eq!(MaxFeatures::Count(20).resolve(8), 8);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
    }

    #[test]
    fn test_unfitted_tree_errors() {
        let (x, _) = steps();
        assert!(matches!(
            DecisionTreeClassifier::default().predict(&x),
            Err(RebalanceError::NotFitted(_))
        ));
    }
}
