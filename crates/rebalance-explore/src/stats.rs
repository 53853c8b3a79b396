use std::collections::HashMap;

use rebalance_core::{Matrix, RebalanceError, RebalanceResult};
use rebalance_io::{Column, Frame};
use serde::Serialize;

/// Non-missing values per distinct value, most frequent first, ties by
/// value.
pub fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for i in 0..column.len() {
        let v = column.display_value(i);
        if v.is_empty() || v == "NaN" {
            continue;
        }
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Summary row of `describe` for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Statistic names in display order.
    pub const STATS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

/// Quantile of sorted data with linear interpolation between ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Summarize one series, skipping NaN.
pub fn summarize(name: &str, values: &[f64]) -> ColumnSummary {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let mean = if n == 0 {
        f64::NAN
    } else {
        sorted.iter().sum::<f64>() / n as f64
    };
    // Sample standard deviation (n - 1)
    let std = if n < 2 {
        f64::NAN
    } else {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    };
    ColumnSummary {
        name: name.to_string(),
        count: n,
        mean,
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: quantile(&sorted, 0.25),
        q50: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Summary statistics for every numeric column of the frame.
pub fn describe(frame: &Frame) -> Vec<ColumnSummary> {
    frame
        .columns()
        .iter()
        .filter_map(|c| c.as_numeric().map(|v| summarize(&c.name, v)))
        .collect()
}

/// Missing cells per column, in frame order.
pub fn null_report(frame: &Frame) -> Vec<(String, usize)> {
    frame
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .collect()
}

/// One line of `info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: &'static str,
}

pub fn info(frame: &Frame) -> Vec<ColumnInfo> {
    frame
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name.clone(),
            non_null: c.len() - c.null_count(),
            dtype: c.dtype(),
        })
        .collect()
}

/// Pearson correlation between the columns of `x`. A constant column
/// correlates 0 with every other column and 1 with itself.
pub fn correlation(x: &Matrix) -> RebalanceResult<Matrix> {
    let (n, p) = x.shape();
    if n < 2 {
        return Err(RebalanceError::EmptyInput(
            "correlation needs at least two rows".into(),
        ));
    }
    let means = x.mean_axis0();
    let centered: Vec<Vec<f64>> = (0..p)
        .map(|j| x.iter_rows().map(|row| row[j] - means[j]).collect())
        .collect();
    let norms: Vec<f64> = centered
        .iter()
        .map(|c| c.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    let mut data = vec![0.0; p * p];
    for a in 0..p {
        for b in 0..p {
            data[a * p + b] = if a == b {
                1.0
            } else if norms[a] == 0.0 || norms[b] == 0.0 {
                0.0
            } else {
                let dot: f64 = centered[a].iter().zip(&centered[b]).map(|(u, v)| u * v).sum();
                (dot / (norms[a] * norms[b])).clamp(-1.0, 1.0)
            };
        }
    }
    Matrix::new(data, p, p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn frame() -> Frame {
        Frame::new(vec![
            Column::categorical(
                "Sex",
                ["M", "F", "M", "I", "", "M"].iter().map(|s| s.to_string()).collect(),
            ),
            Column::numeric("Length", vec![1.0, 2.0, 3.0, 4.0, f64::NAN, 5.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_value_counts_sorted_by_count_then_value() {
        let f = frame();
        let counts = value_counts(f.column("Sex").unwrap());
        assert_eq!(
            counts,
            vec![("M".to_string(), 3), ("F".to_string(), 1), ("I".to_string(), 1)]
        );
    }

    #[test]
    fn test_describe_skips_missing() {
        let summary = describe(&frame());
        assert_eq!(summary.len(), 1);
        let s = &summary[0];
        assert_eq!(s.count, 5);
        assert_abs_diff_eq!(s.mean, 3.0);
        assert_abs_diff_eq!(s.std, 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(s.q25, 2.0);
        assert_abs_diff_eq!(s.q50, 3.0);
        assert_eq!((s.min, s.max), (1.0, 5.0));
    }

    #[test]
    fn test_quantile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(quantile(&v, 0.25), 1.75);
        assert_abs_diff_eq!(quantile(&v, 0.5), 2.5);
        assert_abs_diff_eq!(quantile(&v, 1.0), 4.0);
    }

    #[test]
    fn test_null_report_and_info() {
        let f = frame();
        assert_eq!(
            null_report(&f),
            vec![("Sex".to_string(), 1), ("Length".to_string(), 1)]
        );
        let i = info(&f);
        assert_eq!(i[0].dtype, "object");
        assert_eq!(i[1].non_null, 5);
    }

    #[test]
    fn test_correlation() {
        let x = Matrix::from_rows(&[
            vec![1.0, 2.0, 5.0, 3.0],
            vec![2.0, 4.0, 4.0, 3.0],
            vec![3.0, 6.0, 3.0, 3.0],
        ])
        .unwrap();
        let c = correlation(&x).unwrap();
        assert_abs_diff_eq!(c.get(0, 1).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.get(0, 2).unwrap(), -1.0, epsilon = 1e-12);
        // constant column
        assert_eq!(c.get(0, 3).unwrap(), 0.0);
        assert_eq!(c.get(3, 3).unwrap(), 1.0);
    }
}
