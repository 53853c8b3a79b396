use rebalance_core::{class_counts, Matrix, RebalanceResult};
use std::collections::BTreeMap;

/// Output of a resampler.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    pub x: Matrix,
    pub y: Vec<usize>,
}

impl Resampled {
    pub fn counts(&self) -> BTreeMap<usize, usize> {
        class_counts(&self.y)
    }

    pub(crate) fn from_indices(x: &Matrix, y: &[usize], indices: &[usize]) -> RebalanceResult<Self> {
        Ok(Resampled {
            x: x.select_rows(indices)?,
            y: indices.iter().map(|&i| y[i]).collect(),
        })
    }
}

/// Trait for resamplers. Samplers are seeded at construction, so repeated
/// calls on the same data give the same result.
pub trait Sampler {
    fn fit_resample(&self, x: &Matrix, y: &[usize]) -> RebalanceResult<Resampled>;

    fn name(&self) -> &'static str;
}

/// Identity sampler: the baseline runs through the same code path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResampling;

impl Sampler for NoResampling {
    fn fit_resample(&self, x: &Matrix, y: &[usize]) -> RebalanceResult<Resampled> {
        rebalance_core::check_xy(x, y)?;
        Ok(Resampled {
            x: x.clone(),
            y: y.to_vec(),
        })
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_resampling_is_identity() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let out = NoResampling.fit_resample(&x, &[0, 1]).unwrap();
        assert_eq!(out.x, x);
        assert_eq!(out.y, vec![0, 1]);
        assert!(NoResampling.fit_resample(&x, &[0]).is_err());
    }
}
