use rebalance_core::{majority_class, minority_class, RebalanceError, RebalanceResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which classes a sampler is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingStrategy {
    /// `NotMajority` for over-samplers, `NotMinority` for the others.
    #[default]
    Auto,
    Majority,
    Minority,
    NotMajority,
    NotMinority,
    All,
}

/// The family a sampler belongs to; decides what `Auto` means and which
/// strategies make sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingKind {
    OverSampling,
    UnderSampling,
    Cleaning,
}

impl SamplingStrategy {
    /// Resolve the strategy against class counts to a sorted list of
    /// targeted class codes.
    pub fn target_classes(
        self,
        counts: &BTreeMap<usize, usize>,
        kind: SamplingKind,
    ) -> RebalanceResult<Vec<usize>> {
        if counts.len() < 2 {
            return Err(RebalanceError::Sampling(format!(
                "resampling needs at least two classes, found {}",
                counts.len()
            )));
        }
        let (majority, minority) = match (majority_class(counts), minority_class(counts)) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(RebalanceError::EmptyInput("no labels to resample".into())),
        };

        let resolved = match (self, kind) {
            (SamplingStrategy::Auto, SamplingKind::OverSampling) => SamplingStrategy::NotMajority,
            (SamplingStrategy::Auto, _) => SamplingStrategy::NotMinority,
            (SamplingStrategy::Majority, SamplingKind::OverSampling) => {
                return Err(RebalanceError::InvalidParameter(
                    "'majority' cannot be used with an over-sampler".into(),
                ))
            }
            (SamplingStrategy::Minority, SamplingKind::UnderSampling | SamplingKind::Cleaning) => {
                return Err(RebalanceError::InvalidParameter(
                    "'minority' cannot be used with an under-sampler or cleaner".into(),
                ))
            }
            (s, _) => s,
        };

        let targets = counts
            .keys()
            .copied()
            .filter(|&c| match resolved {
                SamplingStrategy::Majority => c == majority,
                SamplingStrategy::Minority => c == minority,
                SamplingStrategy::NotMajority => c != majority,
                SamplingStrategy::NotMinority => c != minority,
                SamplingStrategy::All | SamplingStrategy::Auto => true,
            })
            .collect();
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebalance_core::class_counts;

    #[test]
    fn test_auto_depends_on_kind() {
        let counts = class_counts(&[0, 0, 0, 1, 2, 2]);
        assert_eq!(
            SamplingStrategy::Auto
                .target_classes(&counts, SamplingKind::OverSampling)
                .unwrap(),
            vec![1, 2]
        );
        assert_eq!(
            SamplingStrategy::Auto
                .target_classes(&counts, SamplingKind::UnderSampling)
                .unwrap(),
            vec![0, 2]
        );
    }

    #[test]
    fn test_majority_and_minority() {
        let counts = class_counts(&[0, 0, 0, 1]);
        assert_eq!(
            SamplingStrategy::Majority
                .target_classes(&counts, SamplingKind::Cleaning)
                .unwrap(),
            vec![0]
        );
        assert_eq!(
            SamplingStrategy::Minority
                .target_classes(&counts, SamplingKind::OverSampling)
                .unwrap(),
            vec![1]
        );
    }

    #[test]
    fn test_rejected_combinations() {
        let counts = class_counts(&[0, 0, 1]);
        assert!(SamplingStrategy::Majority
            .target_classes(&counts, SamplingKind::OverSampling)
            .is_err());
        assert!(SamplingStrategy::Minority
            .target_classes(&counts, SamplingKind::UnderSampling)
            .is_err());
        let single = class_counts(&[0, 0]);
        assert!(SamplingStrategy::All
            .target_classes(&single, SamplingKind::OverSampling)
            .is_err());
    }
}
