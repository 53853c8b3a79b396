use rebalance_core::{check_xy, class_counts, Matrix, RebalanceResult};
use rebalance_neighbors::NearestNeighbors;
use tracing::debug;

use crate::sampler::{Resampled, Sampler};
use crate::strategy::{SamplingKind, SamplingStrategy};

/// Tomek Links cleaning.
///
/// Two samples of different classes form a link when each is the other's
/// nearest neighbour. Link members whose class is targeted are removed,
/// which widens the gap between the classes along the boundary.
#[derive(Debug, Clone, Default)]
pub struct TomekLinks {
    pub strategy: SamplingStrategy,
}

impl TomekLinks {
    pub fn new(strategy: SamplingStrategy) -> Self {
        TomekLinks { strategy }
    }

    /// Flag every sample that takes part in a Tomek link.
    pub fn links(x: &Matrix, y: &[usize]) -> RebalanceResult<Vec<bool>> {
        check_xy(x, y)?;
        let mut nn = NearestNeighbors::new();
        nn.fit(x)?;
        let nearest = nn.nearest_of_each()?;
        Ok((0..y.len())
            .map(|i| {
                let j = nearest[i];
                y[i] != y[j] && nearest[j] == i
            })
            .collect())
    }
}

impl Sampler for TomekLinks {
    fn fit_resample(&self, x: &Matrix, y: &[usize]) -> RebalanceResult<Resampled> {
        check_xy(x, y)?;
        let counts = class_counts(y);
        let targets = self.strategy.target_classes(&counts, SamplingKind::Cleaning)?;
        let in_link = Self::links(x, y)?;

        let keep: Vec<usize> = (0..y.len())
            .filter(|&i| !(in_link[i] && targets.contains(&y[i])))
            .collect();

        debug!(
            links = in_link.iter().filter(|&&l| l).count(),
            removed = y.len() - keep.len(),
            "tomek links"
        );
        Resampled::from_indices(x, y, &keep)
    }

    fn name(&self) -> &'static str {
        "tomek-links"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Majority points at 0, 1, 2 and 5.2; minority at 5 and 9.
    // 5.2 <-> 5 is the only mutual nearest pair across classes.
    fn boundary() -> (Matrix, Vec<usize>) {
        let x = Matrix::from_rows(&[
            vec![0.0],
            vec![1.0],
            vec![2.0],
            vec![5.2],
            vec![5.0],
            vec![9.0],
        ])
        .unwrap();
        (x, vec![0, 0, 0, 0, 1, 1])
    }

    #[test]
    fn test_finds_mutual_opposite_pairs() {
        let (x, y) = boundary();
        let links = TomekLinks::links(&x, &y).unwrap();
        assert_eq!(links, vec![false, false, false, true, true, false]);
    }

    #[test]
    fn test_removes_only_majority_member() {
        let (x, y) = boundary();
        let out = TomekLinks::new(SamplingStrategy::Majority)
            .fit_resample(&x, &y)
            .unwrap();
        assert_eq!(out.y, vec![0, 0, 0, 1, 1]);
        assert_eq!(out.x.col(0).unwrap(), vec![0.0, 1.0, 2.0, 5.0, 9.0]);
    }

    #[test]
    fn test_all_removes_both_members() {
        let (x, y) = boundary();
        let out = TomekLinks::new(SamplingStrategy::All).fit_resample(&x, &y).unwrap();
        assert_eq!(out.y, vec![0, 0, 0, 1]);
    }
}
