use std::collections::BTreeMap;

/// Count samples per class code, ordered by class.
pub fn class_counts(y: &[usize]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for &c in y {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts
}

/// Number of classes implied by the largest code present.
pub fn n_classes(y: &[usize]) -> usize {
    y.iter().max().map(|&m| m + 1).unwrap_or(0)
}

/// Most frequent class; ties go to the smaller code.
pub fn majority_class(counts: &BTreeMap<usize, usize>) -> Option<usize> {
    counts
        .iter()
        .fold(None, |best: Option<(usize, usize)>, (&c, &n)| match best {
            Some((_, bn)) if bn >= n => best,
            _ => Some((c, n)),
        })
        .map(|(c, _)| c)
}

/// Least frequent class; ties go to the smaller code.
pub fn minority_class(counts: &BTreeMap<usize, usize>) -> Option<usize> {
    counts
        .iter()
        .fold(None, |best: Option<(usize, usize)>, (&c, &n)| match best {
            Some((_, bn)) if bn <= n => best,
            _ => Some((c, n)),
        })
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_extremes() {
        let y = vec![0, 0, 1, 0, 2, 2];
        let counts = class_counts(&y);
        assert_eq!(counts.get(&0), Some(&3));
        assert_eq!(counts.get(&1), Some(&1));
        assert_eq!(majority_class(&counts), Some(0));
        assert_eq!(minority_class(&counts), Some(1));
        assert_eq!(n_classes(&y), 3);
    }

    #[test]
    fn test_ties_prefer_smaller_code() {
        let counts = class_counts(&[1, 0, 1, 0]);
        assert_eq!(majority_class(&counts), Some(0));
        assert_eq!(minority_class(&counts), Some(0));
        assert_eq!(majority_class(&BTreeMap::new()), None);
    }
}
