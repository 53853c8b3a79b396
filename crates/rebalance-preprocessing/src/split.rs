use rebalance_core::{check_xy, Matrix, RebalanceError, RebalanceResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `0..n` and cut it into `(train, test)` index sets.
///
/// The test part holds `ceil(n * test_ratio)` samples; both parts must end
/// up non-empty.
pub fn train_test_indices(
    n: usize,
    test_ratio: f64,
    seed: Option<u64>,
) -> RebalanceResult<(Vec<usize>, Vec<usize>)> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(RebalanceError::InvalidParameter(format!(
            "test_ratio must be in (0, 1), got {test_ratio}"
        )));
    }
    let test_size = (n as f64 * test_ratio).ceil() as usize;
    if test_size == 0 || test_size >= n {
        return Err(RebalanceError::InvalidParameter(format!(
            "test_ratio {test_ratio} on {n} samples leaves an empty train or test set"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let test = indices.split_off(n - test_size);
    Ok((indices, test))
}

/// Split data into training and test sets.
///
/// Returns `(x_train, x_test, y_train, y_test)`.
pub fn train_test_split(
    x: &Matrix,
    y: &[usize],
    test_ratio: f64,
    seed: Option<u64>,
) -> RebalanceResult<(Matrix, Matrix, Vec<usize>, Vec<usize>)> {
    check_xy(x, y)?;
    let (train, test) = train_test_indices(x.rows(), test_ratio, seed)?;
    Ok((
        x.select_rows(&train)?,
        x.select_rows(&test)?,
        train.iter().map(|&i| y[i]).collect(),
        test.iter().map(|&i| y[i]).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(n: usize) -> (Matrix, Vec<usize>) {
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, (i * 2) as f64]).collect();
        let y = (0..n).map(|i| i % 2).collect();
        (Matrix::from_rows(&rows).unwrap(), y)
    }

    #[test]
    fn test_train_test_split_sizes() {
        let (x, y) = data(731);
        let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.2, Some(50)).unwrap();
        // ceil(731 * 0.2) = 147
        assert_eq!(x_test.rows(), 147);
        assert_eq!(x_train.rows(), 584);
        assert_eq!(y_train.len(), 584);
        assert_eq!(y_test.len(), 147);
    }

    #[test]
    fn test_split_keeps_rows_aligned() {
        let (x, y) = data(20);
        let (x_train, _, y_train, _) = train_test_split(&x, &y, 0.25, Some(7)).unwrap();
        for (row, &label) in x_train.iter_rows().zip(&y_train) {
            assert_eq!(row[0] as usize % 2, label);
            assert_eq!(row[1], row[0] * 2.0);
        }
    }

    #[test]
    fn test_split_is_a_partition_and_seeded() {
        let (train, test) = train_test_indices(50, 0.3, Some(1)).unwrap();
        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
        assert_eq!(train_test_indices(50, 0.3, Some(1)).unwrap(), (train, test));
    }

    #[test]
    fn test_bad_ratios() {
        assert!(train_test_indices(10, 0.0, None).is_err());
        assert!(train_test_indices(10, 1.0, None).is_err());
        assert!(train_test_indices(1, 0.5, None).is_err());
    }
}
