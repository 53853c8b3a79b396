use rebalance_core::{check_xy, class_counts, Matrix, RebalanceError, RebalanceResult};
use rebalance_neighbors::NearestNeighbors;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::sampler::{Resampled, Sampler};
use crate::strategy::{SamplingKind, SamplingStrategy};

/// SMOTE (Synthetic Minority Over-sampling TEchnique).
///
/// For each targeted class, new samples are placed at a random point on the
/// segment between a random class member and one of its `k_neighbors`
/// nearest same-class neighbours, until the class matches the majority
/// count. Original samples come first in the output.
#[derive(Debug, Clone)]
pub struct Smote {
    pub strategy: SamplingStrategy,
    pub k_neighbors: usize,
    pub seed: Option<u64>,
}

impl Smote {
    pub fn new(strategy: SamplingStrategy, k_neighbors: usize, seed: Option<u64>) -> Self {
        Smote {
            strategy,
            k_neighbors,
            seed,
        }
    }
}

impl Default for Smote {
    fn default() -> Self {
        Smote::new(SamplingStrategy::Auto, 5, None)
    }
}

impl Sampler for Smote {
    fn fit_resample(&self, x: &Matrix, y: &[usize]) -> RebalanceResult<Resampled> {
        check_xy(x, y)?;
        if self.k_neighbors == 0 {
            return Err(RebalanceError::InvalidParameter(
                "k_neighbors must be at least 1".into(),
            ));
        }
        let counts = class_counts(y);
        let targets = self
            .strategy
            .target_classes(&counts, SamplingKind::OverSampling)?;
        let n_major = counts.values().copied().max().unwrap_or(0);
        let k = self.k_neighbors;

        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let mut x_out = x.clone();
        let mut y_out = y.to_vec();

        for &class in &targets {
            let members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            let n_new = n_major - members.len();
            if n_new == 0 {
                continue;
            }
            if members.len() <= k {
                return Err(RebalanceError::Sampling(format!(
                    "SMOTE needs more than k_neighbors={k} samples of class {class}, found {}",
                    members.len()
                )));
            }

            let class_x = x.select_rows(&members)?;
            let mut nn = NearestNeighbors::new();
            nn.fit(&class_x)?;
            let neighbours: Vec<Vec<usize>> = (0..members.len())
                .map(|i| {
                    nn.kneighbors(class_x.row(i), k, Some(i))
                        .map(|found| found.into_iter().map(|n| n.index).collect())
                })
                .collect::<RebalanceResult<_>>()?;

            let mut synthetic = vec![0.0; x.cols()];
            for _ in 0..n_new {
                let i = rng.gen_range(0..members.len());
                let j = neighbours[i][rng.gen_range(0..k)];
                let gap: f64 = rng.gen();
                let (a, b) = (class_x.row(i), class_x.row(j));
                for (s, (&av, &bv)) in synthetic.iter_mut().zip(a.iter().zip(b)) {
                    *s = av + gap * (bv - av);
                }
                x_out.push_row(&synthetic)?;
                y_out.push(class);
            }
            debug!(class, generated = n_new, "smote");
        }

        Ok(Resampled { x: x_out, y: y_out })
    }

    fn name(&self) -> &'static str {
        "smote"
    }
}
