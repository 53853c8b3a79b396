use rebalance_core::{check_xy, class_counts, Matrix, RebalanceResult};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::sampler::{Resampled, Sampler};
use crate::strategy::{SamplingKind, SamplingStrategy};

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Drop random samples of the targeted classes, without replacement, until
/// each holds as many samples as the minority class.
#[derive(Debug, Clone)]
pub struct RandomUnderSampler {
    pub strategy: SamplingStrategy,
    pub seed: Option<u64>,
}

impl RandomUnderSampler {
    pub fn new(strategy: SamplingStrategy, seed: Option<u64>) -> Self {
        RandomUnderSampler { strategy, seed }
    }
}

impl Sampler for RandomUnderSampler {
    fn fit_resample(&self, x: &Matrix, y: &[usize]) -> RebalanceResult<Resampled> {
        check_xy(x, y)?;
        let counts = class_counts(y);
        let targets = self
            .strategy
            .target_classes(&counts, SamplingKind::UnderSampling)?;
        let n_keep = counts.values().copied().min().unwrap_or(0);
        let mut rng = rng_for(self.seed);

        let mut keep = Vec::new();
        for &class in counts.keys() {
            let members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            if targets.contains(&class) {
                let mut chosen: Vec<usize> = index::sample(&mut rng, members.len(), n_keep)
                    .into_iter()
                    .map(|k| members[k])
                    .collect();
                chosen.sort_unstable();
                keep.extend(chosen);
            } else {
                keep.extend(members);
            }
        }

        debug!(before = y.len(), after = keep.len(), "random under-sampling");
        Resampled::from_indices(x, y, &keep)
    }

    fn name(&self) -> &'static str {
        "random-under"
    }
}

/// Duplicate random samples of the targeted classes, with replacement,
/// until each holds as many samples as the majority class. The original
/// samples are kept, synthetic duplicates are appended.
#[derive(Debug, Clone)]
pub struct RandomOverSampler {
    pub strategy: SamplingStrategy,
    pub seed: Option<u64>,
}

impl RandomOverSampler {
    pub fn new(strategy: SamplingStrategy, seed: Option<u64>) -> Self {
        RandomOverSampler { strategy, seed }
    }
}

impl Sampler for RandomOverSampler {
    fn fit_resample(&self, x: &Matrix, y: &[usize]) -> RebalanceResult<Resampled> {
        check_xy(x, y)?;
        let counts = class_counts(y);
        let targets = self
            .strategy
            .target_classes(&counts, SamplingKind::OverSampling)?;
        let n_major = counts.values().copied().max().unwrap_or(0);
        let mut rng = rng_for(self.seed);

        let mut out: Vec<usize> = (0..y.len()).collect();
        for &class in &targets {
            let members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            let missing = n_major - members.len();
            out.extend((0..missing).map(|_| members[rng.gen_range(0..members.len())]));
        }

        debug!(before = y.len(), after = out.len(), "random over-sampling");
        Resampled::from_indices(x, y, &out)
    }

    fn name(&self) -> &'static str {
        "random-over"
    }
}
