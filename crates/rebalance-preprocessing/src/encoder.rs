use rebalance_core::{RebalanceError, RebalanceResult};
use std::collections::HashMap;

/// Encode categorical string labels as integer codes.
///
/// The vocabulary is sorted, so codes follow lexical order
/// (`F`→0, `I`→1, `M`→2; `negative`→0, `positive`→1).
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    classes: Vec<String>,
    class_to_idx: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder on string labels.
    pub fn fit(&mut self, labels: &[String]) {
        let mut unique: Vec<String> = labels.to_vec();
        unique.sort();
        unique.dedup();
        self.class_to_idx = unique
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        self.classes = unique;
    }

    /// Map labels to codes. Labels not seen during `fit` are an error.
    pub fn transform(&self, labels: &[String]) -> RebalanceResult<Vec<usize>> {
        labels
            .iter()
            .map(|l| {
                self.class_to_idx
                    .get(l)
                    .copied()
                    .ok_or_else(|| RebalanceError::UnknownLabel {
                        label: l.clone(),
                        known: self.classes.clone(),
                    })
            })
            .collect()
    }

    pub fn fit_transform(&mut self, labels: &[String]) -> RebalanceResult<Vec<usize>> {
        self.fit(labels);
        self.transform(labels)
    }

    /// Inverse transform: code → label.
    pub fn inverse_transform(&self, codes: &[usize]) -> RebalanceResult<Vec<String>> {
        codes
            .iter()
            .map(|&c| {
                self.classes
                    .get(c)
                    .cloned()
                    .ok_or(RebalanceError::IndexOutOfBounds {
                        index: c,
                        axis: 0,
                        size: self.classes.len(),
                    })
            })
            .collect()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_label_encoder_sorted_codes() {
        let mut enc = LabelEncoder::new();
        let labels = strings(&["M", "F", "I", "M"]);
        let codes = enc.fit_transform(&labels).unwrap();
        assert_eq!(enc.classes(), &["F", "I", "M"]);
        assert_eq!(codes, vec![2, 0, 1, 2]);
        assert_eq!(enc.inverse_transform(&codes).unwrap(), labels);
    }

    #[test]
    fn test_binary_class_codes() {
        let mut enc = LabelEncoder::new();
        let codes = enc
            .fit_transform(&strings(&["positive", "negative", "negative"]))
            .unwrap();
        assert_eq!(codes, vec![1, 0, 0]);
        assert_eq!(enc.n_classes(), 2);
    }

    #[test]
    fn test_unknown_label_is_error() {
        let mut enc = LabelEncoder::new();
        enc.fit(&strings(&["a", "b"]));
        let err = enc.transform(&strings(&["c"])).unwrap_err();
        assert!(matches!(err, RebalanceError::UnknownLabel { .. }));
        assert!(enc.inverse_transform(&[5]).is_err());
    }
}
