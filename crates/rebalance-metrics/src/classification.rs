use rebalance_core::{RebalanceError, RebalanceResult};

fn check_pair(y_true: &[usize], y_pred: &[usize]) -> RebalanceResult<()> {
    if y_true.len() != y_pred.len() {
        return Err(RebalanceError::ShapeMismatch {
            expected: vec![y_true.len()],
            got: vec![y_pred.len()],
        });
    }
    if y_true.is_empty() {
        return Err(RebalanceError::EmptyInput("metrics on zero predictions".into()));
    }
    Ok(())
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Compute accuracy: fraction of correct predictions.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> RebalanceResult<f64> {
    check_pair(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(ratio(correct, y_true.len()))
}

/// Confusion matrix of shape `[n_classes][n_classes]`: rows are true
/// classes, columns are predicted classes.
pub fn confusion_matrix(
    y_true: &[usize],
    y_pred: &[usize],
    n_classes: usize,
) -> RebalanceResult<Vec<Vec<usize>>> {
    check_pair(y_true, y_pred)?;
    let mut matrix = vec![vec![0usize; n_classes]; n_classes];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t >= n_classes || p >= n_classes {
            return Err(RebalanceError::IndexOutOfBounds {
                index: t.max(p),
                axis: 0,
                size: n_classes,
            });
        }
        matrix[t][p] += 1;
    }
    Ok(matrix)
}

/// Precision of `class` read off a confusion matrix.
pub fn precision_from_matrix(cm: &[Vec<usize>], class: usize) -> f64 {
    let tp = cm[class][class];
    let predicted: usize = cm.iter().map(|row| row[class]).sum();
    ratio(tp, predicted)
}

/// Recall of `class` read off a confusion matrix.
pub fn recall_from_matrix(cm: &[Vec<usize>], class: usize) -> f64 {
    let tp = cm[class][class];
    ratio(tp, cm[class].iter().sum())
}

pub fn f1_from_matrix(cm: &[Vec<usize>], class: usize) -> f64 {
    let p = precision_from_matrix(cm, class);
    let r = recall_from_matrix(cm, class);
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

fn class_matrix(y_true: &[usize], y_pred: &[usize], class: usize) -> RebalanceResult<Vec<Vec<usize>>> {
    let n_classes = y_true
        .iter()
        .chain(y_pred)
        .copied()
        .max()
        .unwrap_or(0)
        .max(class)
        + 1;
    confusion_matrix(y_true, y_pred, n_classes)
}

/// Precision for a specific class.
pub fn precision_class(y_true: &[usize], y_pred: &[usize], class: usize) -> RebalanceResult<f64> {
    Ok(precision_from_matrix(&class_matrix(y_true, y_pred, class)?, class))
}

/// Recall for a specific class.
pub fn recall_class(y_true: &[usize], y_pred: &[usize], class: usize) -> RebalanceResult<f64> {
    Ok(recall_from_matrix(&class_matrix(y_true, y_pred, class)?, class))
}

/// F1 score for a specific class.
pub fn f1_score_class(y_true: &[usize], y_pred: &[usize], class: usize) -> RebalanceResult<f64> {
    Ok(f1_from_matrix(&class_matrix(y_true, y_pred, class)?, class))
}

/// Number of true samples of `class`.
pub fn support_class(y_true: &[usize], class: usize) -> usize {
    y_true.iter().filter(|&&t| t == class).count()
}
