use std::fmt;

use rebalance_core::RebalanceResult;
use serde::{Deserialize, Serialize};

use crate::classification::{confusion_matrix, f1_from_matrix, precision_from_matrix, recall_from_matrix};

/// Scores for one class, or one averaged row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall, F1 and support, plus accuracy and the
/// macro and support-weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
    pub confusion: Vec<Vec<usize>>,
}

impl ClassificationReport {
    /// Build the report. Classes beyond `target_names` are labelled by
    /// their code.
    pub fn new(y_true: &[usize], y_pred: &[usize], target_names: &[String]) -> RebalanceResult<Self> {
        let n_classes = y_true
            .iter()
            .chain(y_pred)
            .map(|&c| c + 1)
            .max()
            .unwrap_or(0)
            .max(target_names.len());
        let cm = confusion_matrix(y_true, y_pred, n_classes)?;

        let classes: Vec<ClassScores> = (0..n_classes)
            .map(|c| ClassScores {
                label: target_names.get(c).cloned().unwrap_or_else(|| c.to_string()),
                precision: precision_from_matrix(&cm, c),
                recall: recall_from_matrix(&cm, c),
                f1: f1_from_matrix(&cm, c),
                support: cm[c].iter().sum(),
            })
            .collect();

        let total = y_true.len();
        let correct: usize = (0..n_classes).map(|c| cm[c][c]).sum();
        let k = n_classes.max(1) as f64;
        let macro_avg = ClassScores {
            label: "macro avg".into(),
            precision: classes.iter().map(|s| s.precision).sum::<f64>() / k,
            recall: classes.iter().map(|s| s.recall).sum::<f64>() / k,
            f1: classes.iter().map(|s| s.f1).sum::<f64>() / k,
            support: total,
        };
        let weight = |f: fn(&ClassScores) -> f64| -> f64 {
            classes.iter().map(|s| f(s) * s.support as f64).sum::<f64>() / total as f64
        };
        let weighted_avg = ClassScores {
            label: "weighted avg".into(),
            precision: weight(|s| s.precision),
            recall: weight(|s| s.recall),
            f1: weight(|s| s.f1),
            support: total,
        };

        Ok(ClassificationReport {
            accuracy: correct as f64 / total as f64,
            classes,
            macro_avg,
            weighted_avg,
            confusion: cm,
        })
    }

    /// Scores of the class labelled `label`.
    pub fn class(&self, label: &str) -> Option<&ClassScores> {
        self.classes.iter().find(|s| s.label == label)
    }
}

const DIGITS: usize = 2;

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|s| s.label.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0);

        let row = |f: &mut fmt::Formatter<'_>, s: &ClassScores| {
            writeln!(
                f,
                "{:>width$}  {:>9.prec$} {:>9.prec$} {:>9.prec$} {:>9}",
                s.label,
                s.precision,
                s.recall,
                s.f1,
                s.support,
                prec = DIGITS
            )
        };

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for s in &self.classes {
            row(f, s)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.prec$} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.macro_avg.support,
            prec = DIGITS
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}
