use std::fs;
use std::path::Path;

use rebalance_core::{RebalanceError, RebalanceResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Logistic regression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogisticConfig {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        LogisticConfig {
            c: 1.0,
            max_iter: 100,
        }
    }
}

/// Random forest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            n_estimators: 12,
            max_depth: 7,
            seed: 50,
        }
    }
}

/// Settings of one study run. Every field has a default, so an empty
/// TOML file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyConfig {
    pub test_ratio: f64,
    pub split_seed: u64,
    pub cv_folds: usize,
    pub sampler_seed: u64,
    pub smote_k_neighbors: usize,
    pub label_column: String,
    pub categorical_columns: Vec<String>,
    /// Feature subset of the reduced-feature experiment, also used by the
    /// resampling stage. Empty skips the experiment and resamples every feature.
    pub reduced_features: Vec<String>,
    /// Rows shown by the head preview.
    pub head_rows: usize,
    pub pair_plot: bool,
    pub logistic: LogisticConfig,
    pub forest: ForestConfig,
}

impl Default for StudyConfig {
    fn default() -> Self {
        StudyConfig {
            test_ratio: 0.2,
            split_seed: 50,
            cv_folds: 5,
            sampler_seed: 50,
            smote_k_neighbors: 5,
            label_column: "Class".into(),
            categorical_columns: vec!["Sex".into()],
            reduced_features: vec!["Diameter".into(), "Length".into()],
            head_rows: 5,
            pair_plot: true,
            logistic: LogisticConfig::default(),
            forest: ForestConfig::default(),
        }
    }
}

impl StudyConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> RebalanceResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| RebalanceError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| RebalanceError::Serialization(format!("{}: {e}", path.display())))?;
        config.validate()?;
        info!(path = %path.display(), "loaded study configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> RebalanceResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| RebalanceError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> RebalanceResult<String> {
        toml::to_string_pretty(self).map_err(|e| RebalanceError::Serialization(e.to_string()))
    }

    /// Check ranges the study relies on.
    pub fn validate(&self) -> RebalanceResult<()> {
        let invalid = |msg: String| Err(RebalanceError::InvalidParameter(msg));
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return invalid(format!("test_ratio must be in (0, 1), got {}", self.test_ratio));
        }
        if self.cv_folds < 2 {
            return invalid(format!("cv_folds must be at least 2, got {}", self.cv_folds));
        }
        if self.smote_k_neighbors == 0 {
            return invalid("smote_k_neighbors must be at least 1".into());
        }
        if self.label_column.trim().is_empty() {
            return invalid("label_column must not be empty".into());
        }
        if self.logistic.c <= 0.0 || self.logistic.max_iter == 0 {
            return invalid("logistic.c must be positive and logistic.max_iter at least 1".into());
        }
        if self.forest.n_estimators == 0 || self.forest.max_depth == 0 {
            return invalid("forest.n_estimators and forest.max_depth must be at least 1".into());
        }
        Ok(())
    }
}
