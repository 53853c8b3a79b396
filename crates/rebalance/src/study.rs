use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rebalance_core::{class_counts, Classifier, Matrix, RebalanceError, RebalanceResult};
use rebalance_explore::{
    bar_chart, confusion_heatmap, correlation, count_plot, describe, frame_table, heatmap,
    info as column_info, matrix_heatmap, null_report, pair_plot, text_table, value_counts,
    ColumnSummary,
};
use rebalance_io::{load_json, save_json, write_csv, Column, Frame};
use rebalance_linear::LogisticRegression;
use rebalance_metrics::ClassificationReport;
use rebalance_preprocessing::{
    cross_val_score, mean_score, train_test_split, LabelEncoder, StratifiedKFold,
};
use rebalance_sampling::{
    NoResampling, RandomOverSampler, RandomUnderSampler, Resampled, Sampler, SamplingStrategy,
    Smote, TomekLinks,
};
use rebalance_tree::RandomForestClassifier;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::StudyConfig;

/// Result of fitting one estimator on one (possibly resampled) training set
/// and scoring it on the held-out set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub name: String,
    pub sampler: String,
    pub estimator: String,
    pub features: Vec<String>,
    /// Class counts of the training set before resampling.
    pub counts_before: BTreeMap<String, usize>,
    /// Class counts the estimator was fitted on.
    pub train_counts: BTreeMap<String, usize>,
    pub train_score: f64,
    pub accuracy: f64,
    pub validation_score: f64,
    pub cv_scores: Vec<f64>,
    pub cv_mean: f64,
    pub predictions: Vec<usize>,
    pub report: ClassificationReport,
}

/// Class counts before and after a whole-dataset resampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampleSummary {
    pub sampler: String,
    pub before: BTreeMap<String, usize>,
    pub after: BTreeMap<String, usize>,
}

/// Everything a study run measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub rows: usize,
    pub columns: usize,
    pub class_counts: Vec<(String, usize)>,
    /// Vocabulary of every encoded column, code order.
    pub encodings: BTreeMap<String, Vec<String>>,
    pub resampling: Vec<ResampleSummary>,
    pub evaluations: Vec<Evaluation>,
}

impl StudyReport {
    pub fn evaluation(&self, name: &str) -> Option<&Evaluation> {
        self.evaluations.iter().find(|e| e.name == name)
    }

    pub fn load(path: impl AsRef<Path>) -> RebalanceResult<Self> {
        load_json(path)
    }
}

/// Write a study report as pretty JSON.
pub fn save_report(path: impl AsRef<Path>, report: &StudyReport) -> RebalanceResult<()> {
    save_json(report, path)
}

/// Held-out split shared by the evaluations of one stage.
struct Split {
    x_train: Matrix,
    x_test: Matrix,
    y_train: Vec<usize>,
    y_test: Vec<usize>,
}

impl Split {
    fn new(x: &Matrix, y: &[usize], ratio: f64, seed: u64) -> RebalanceResult<Self> {
        let (x_train, x_test, y_train, y_test) = train_test_split(x, y, ratio, Some(seed))?;
        Ok(Split {
            x_train,
            x_test,
            y_train,
            y_test,
        })
    }
}

fn named_counts(y: &[usize], classes: &[String]) -> BTreeMap<String, usize> {
    class_counts(y)
        .into_iter()
        .map(|(c, n)| (classes.get(c).cloned().unwrap_or_else(|| c.to_string()), n))
        .collect()
}

fn percent(v: f64) -> String {
    format!("{:.2}", v * 100.0)
}

/// The imbalanced-classification study: explore the data, encode it, then
/// compare estimators across resampling strategies. Narration goes to the
/// writer, measurements into the returned [`StudyReport`].
pub struct Study<W: Write> {
    config: StudyConfig,
    out: W,
    export_dir: Option<PathBuf>,
}

impl Study<io::Stdout> {
    pub fn new(config: StudyConfig) -> Self {
        Study::with_writer(config, io::stdout())
    }
}

impl<W: Write> Study<W> {
    pub fn with_writer(config: StudyConfig, out: W) -> Self {
        Study {
            config,
            out,
            export_dir: None,
        }
    }

    /// Write every resampled training set as CSV into `dir`.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    fn say(&mut self, text: impl Display) -> RebalanceResult<()> {
        writeln!(self.out, "{text}").map_err(|e| RebalanceError::Io {
            path: "<study output>".into(),
            source: e,
        })
    }

    fn section(&mut self, title: &str) -> RebalanceResult<()> {
        info!(stage = title, "study stage");
        self.say(format!("\n═══ {title} ═══\n"))
    }

    // ─── Exploration ────────────────────────────────────────────

    /// Head, shape, value counts, null check, info, statistics heatmap and
    /// pair plot of the raw frame.
    pub fn explore(&mut self, frame: &Frame) -> RebalanceResult<()> {
        let label = self.config.label_column.clone();
        frame.column(&label)?;

        self.section("Data")?;
        self.say(frame_table(frame, self.config.head_rows))?;
        let (rows, cols) = frame.shape();
        self.say(format!("shape: ({rows}, {cols})"))?;

        self.section("Value counts")?;
        for name in self.config.categorical_columns.clone() {
            self.say(count_plot(frame, &name)?)?;
        }
        self.say(count_plot(frame, &label)?)?;

        self.section("Missing values")?;
        let nulls: Vec<Vec<String>> = null_report(frame)
            .into_iter()
            .map(|(name, n)| vec![name, (n > 0).to_string(), n.to_string()])
            .collect();
        self.say(text_table(&["column", "any null", "null count"], &nulls))?;

        let rows: Vec<Vec<String>> = column_info(frame)
            .into_iter()
            .enumerate()
            .map(|(i, c)| vec![i.to_string(), c.name, c.non_null.to_string(), c.dtype.to_string()])
            .collect();
        self.say(text_table(&["#", "column", "non-null", "dtype"], &rows))?;

        let summary = describe(frame);
        if !summary.is_empty() {
            // statistics transposed, without the count column
            let stat_names: Vec<String> =
                ColumnSummary::STATS[1..].iter().map(|s| s.to_string()).collect();
            let names: Vec<String> = summary.iter().map(|s| s.name.clone()).collect();
            let values: Vec<Vec<f64>> = summary.iter().map(|s| s.values()[1..].to_vec()).collect();
            self.say(heatmap("Basic statistics (transposed)", &names, &stat_names, &values)?)?;
        }

        if self.config.pair_plot {
            let features = frame.numeric_names();
            self.say(pair_plot(frame, &features, &label)?)?;
        }
        Ok(())
    }

    // ─── Evaluation ─────────────────────────────────────────────

    fn evaluate<S: Sampler + ?Sized, C: Classifier>(
        &mut self,
        name: &str,
        sampler: &S,
        mut model: C,
        features: &[String],
        split: &Split,
        classes: &[String],
    ) -> RebalanceResult<(Evaluation, Resampled)> {
        self.section(name)?;
        let counts_before = named_counts(&split.y_train, classes);
        let resampled = sampler.fit_resample(&split.x_train, &split.y_train)?;
        let train_counts = named_counts(&resampled.y, classes);
        if sampler.name() != NoResampling.name() {
            self.say(bar_chart(
                &format!("class counts before {}", sampler.name()),
                &counts_before.clone().into_iter().collect::<Vec<_>>(),
            ))?;
            self.say(bar_chart(
                &format!("class counts after {}", sampler.name()),
                &train_counts.clone().into_iter().collect::<Vec<_>>(),
            ))?;
        }

        let template = model.clone();
        model.fit(&resampled.x, &resampled.y)?;
        let predictions = model.predict(&split.x_test)?;
        let train_score = model.score(&resampled.x, &resampled.y)?;
        let validation_score = model.score(&split.x_test, &split.y_test)?;
        let report = ClassificationReport::new(&split.y_test, &predictions, classes)?;
        let cv = StratifiedKFold::new(self.config.cv_folds);
        let cv_scores = cross_val_score(&template, &resampled.x, &resampled.y, &cv)?;
        let cv_mean = mean_score(&cv_scores);

        let shown: Vec<String> = predictions.iter().map(usize::to_string).collect();
        self.say(format!("Prediction : [{}]\n", shown.join(" ")))?;
        self.say(format!("Training Score : {}", percent(train_score)))?;
        self.say(format!("Validation Score : {}", percent(validation_score)))?;
        self.say(format!("Accuracy Score : {}", percent(report.accuracy)))?;
        self.say(format!("Cross Validation Score : {}", percent(cv_mean)))?;
        self.say(format!("Classification Report :\n\n{report}"))?;
        self.say(confusion_heatmap(
            "Confusion matrix (diagonal = correct)",
            &report.confusion,
            classes,
        )?)?;

        info!(
            evaluation = name,
            accuracy = report.accuracy,
            cv_mean,
            "evaluation finished"
        );
        let evaluation = Evaluation {
            name: name.to_string(),
            sampler: sampler.name().to_string(),
            estimator: model.name().to_string(),
            features: features.to_vec(),
            counts_before,
            train_counts,
            train_score,
            accuracy: report.accuracy,
            validation_score,
            cv_scores,
            cv_mean,
            predictions,
            report,
        };
        Ok((evaluation, resampled))
    }

    fn export(
        &mut self,
        file: &str,
        features: &[String],
        x: &Matrix,
        y: &[usize],
        encoder: &LabelEncoder,
    ) -> RebalanceResult<()> {
        let Some(dir) = self.export_dir.clone() else {
            return Ok(());
        };
        let path: PathBuf = Path::new(&dir).join(file);
        let labels = encoder.inverse_transform(y)?;
        write_csv(&path, features, x, &self.config.label_column, &labels)?;
        self.say(format!("exported {}", path.display()))
    }

    fn logistic(&self) -> LogisticRegression {
        LogisticRegression::new(self.config.logistic.c, self.config.logistic.max_iter)
    }

    // ─── Full run ───────────────────────────────────────────────

    /// Run every stage on `frame` and collect the measurements.
    pub fn run(&mut self, frame: &Frame) -> RebalanceResult<StudyReport> {
        let cfg = self.config.clone();
        cfg.validate()?;
        self.explore(frame)?;

        // Encode categorical features and the label
        self.section("Label encoding")?;
        let mut encoded = frame.clone();
        let mut encodings = BTreeMap::new();
        for name in &cfg.categorical_columns {
            let mut enc = LabelEncoder::new();
            let codes = enc.fit_transform(&encoded.column(name)?.to_strings())?;
            let codes: Vec<f64> = codes.iter().map(|&c| c as f64).collect();
            encoded.replace_column(Column::numeric(name.clone(), codes))?;
            encodings.insert(name.clone(), enc.classes().to_vec());
        }
        let mut label_encoder = LabelEncoder::new();
        let y = label_encoder.fit_transform(&encoded.column(&cfg.label_column)?.to_strings())?;
        encoded.replace_column(Column::numeric(
            cfg.label_column.clone(),
            y.iter().map(|&c| c as f64).collect(),
        ))?;
        let classes = label_encoder.classes().to_vec();
        encodings.insert(cfg.label_column.clone(), classes.clone());
        for (name, vocab) in &encodings {
            let mapping: Vec<String> = vocab.iter().enumerate().map(|(i, v)| format!("{v} -> {i}")).collect();
            self.say(format!("{name}: {}", mapping.join(", ")))?;
        }
        self.say(frame_table(&encoded, cfg.head_rows))?;

        let all_names: Vec<String> = encoded.column_names().iter().map(|s| s.to_string()).collect();
        let corr = correlation(&encoded.to_matrix(&all_names)?)?;
        self.say(matrix_heatmap("Correlation", &all_names, &corr)?)?;

        let features = encoded.names_except(&cfg.label_column);
        let x = encoded.to_matrix(&features)?;
        let mut evaluations = Vec::new();

        // Baseline on every feature
        let split = Split::new(&x, &y, cfg.test_ratio, cfg.split_seed)?;
        let model = self.logistic();
        let (baseline, _) = self.evaluate(
            "Baseline: logistic regression",
            &NoResampling,
            model,
            &features,
            &split,
            &classes,
        )?;
        evaluations.push(baseline);

        // Reduced feature set; when present, the resampling stage works on it too
        let (stage_features, stage_split) = if cfg.reduced_features.is_empty() {
            (features.clone(), split)
        } else {
            let x_reduced = encoded.to_matrix(&cfg.reduced_features)?;
            let reduced = Split::new(&x_reduced, &y, cfg.test_ratio, cfg.split_seed)?;
            let model = self.logistic();
            let name = format!("Reduced features ({})", cfg.reduced_features.join(", "));
            let (evaluation, _) = self.evaluate(
                &name,
                &NoResampling,
                model,
                &cfg.reduced_features,
                &reduced,
                &classes,
            )?;
            evaluations.push(evaluation);
            (cfg.reduced_features.clone(), reduced)
        };

        // Whole-dataset random resampling
        self.section("Random resampling")?;
        let mut resampling = Vec::new();
        let whole: [(&str, Box<dyn Sampler>); 2] = [
            (
                "random_under.csv",
                Box::new(RandomUnderSampler::new(SamplingStrategy::Majority, Some(cfg.sampler_seed))),
            ),
            (
                "random_over.csv",
                Box::new(RandomOverSampler::new(SamplingStrategy::Minority, Some(cfg.sampler_seed))),
            ),
        ];
        for (file, sampler) in whole {
            let out = sampler.fit_resample(&x, &y)?;
            let after = named_counts(&out.y, &classes);
            self.say(bar_chart(
                &format!("{} class counts", sampler.name()),
                &after.clone().into_iter().collect::<Vec<_>>(),
            ))?;
            self.export(file, &features, &out.x, &out.y, &label_encoder)?;
            resampling.push(ResampleSummary {
                sampler: sampler.name().to_string(),
                before: named_counts(&y, &classes),
                after,
            });
        }

        // Resamplers are fitted on a second split of the training part only
        self.section("Resampling split")?;
        let inner = Split::new(
            &stage_split.x_train,
            &stage_split.y_train,
            cfg.test_ratio,
            cfg.split_seed,
        )?;
        self.say(format!(
            "features [{}]: x_train {:?}, x_test {:?}, y_train ({},), y_test ({},)",
            stage_features.join(", "),
            inner.x_train.shape(),
            inner.x_test.shape(),
            inner.y_train.len(),
            inner.y_test.len()
        ))?;

        let tomek = TomekLinks::new(SamplingStrategy::Majority);
        let model = self.logistic();
        let (evaluation, cleaned) = self.evaluate(
            "Tomek Links + logistic regression",
            &tomek,
            model,
            &stage_features,
            &inner,
            &classes,
        )?;
        evaluations.push(evaluation);
        self.export("tomek_links.csv", &stage_features, &cleaned.x, &cleaned.y, &label_encoder)?;

        let smote = Smote::new(
            SamplingStrategy::Minority,
            cfg.smote_k_neighbors,
            Some(cfg.sampler_seed),
        );
        let model = self.logistic();
        let (evaluation, synthetic) = self.evaluate(
            "SMOTE + logistic regression",
            &smote,
            model,
            &stage_features,
            &inner,
            &classes,
        )?;
        evaluations.push(evaluation);
        self.export("smote.csv", &stage_features, &synthetic.x, &synthetic.y, &label_encoder)?;

        let forest = RandomForestClassifier::new(
            cfg.forest.n_estimators,
            cfg.forest.max_depth,
            Some(cfg.forest.seed),
        );
        let (evaluation, _) = self.evaluate(
            "SMOTE + random forest",
            &smote,
            forest,
            &stage_features,
            &inner,
            &classes,
        )?;
        evaluations.push(evaluation);

        self.summary(&evaluations, &classes)?;

        Ok(StudyReport {
            rows: frame.n_rows(),
            columns: frame.n_cols(),
            class_counts: value_counts(frame.column(&cfg.label_column)?),
            encodings,
            resampling,
            evaluations,
        })
    }

    fn summary(&mut self, evaluations: &[Evaluation], classes: &[String]) -> RebalanceResult<()> {
        self.section("Summary")?;
        // the rarest class in the label vocabulary is the one of interest
        let minority = evaluations
            .first()
            .and_then(|e| e.counts_before.iter().min_by_key(|(_, n)| **n).map(|(c, _)| c.clone()))
            .or_else(|| classes.last().cloned())
            .unwrap_or_default();
        let rows: Vec<Vec<String>> = evaluations
            .iter()
            .map(|e| {
                let counts: Vec<String> = e.train_counts.iter().map(|(c, n)| format!("{c}={n}")).collect();
                let recall = e.report.class(&minority).map_or(0.0, |s| s.recall);
                vec![
                    e.name.clone(),
                    counts.join(" "),
                    percent(e.accuracy),
                    percent(e.cv_mean),
                    format!("{recall:.2}"),
                ]
            })
            .collect();
        let recall_header = format!("recall ({minority})");
        self.say(text_table(
            &["evaluation", "train counts", "accuracy %", "cv mean %", &recall_header],
            &rows,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_counts_uses_vocabulary() {
        let classes = vec!["negative".to_string(), "positive".to_string()];
        let counts = named_counts(&[0, 0, 1, 0], &classes);
        assert_eq!(counts["negative"], 3);
        assert_eq!(counts["positive"], 1);
    }

    #[test]
    fn test_explore_requires_label_column() {
        let frame = Frame::new(vec![Column::numeric("a", vec![1.0, 2.0])]).unwrap();
        let mut study = Study::with_writer(StudyConfig::default(), Vec::new());
        assert!(matches!(study.explore(&frame), Err(RebalanceError::MissingColumn(_))));
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(0.95238), "95.24");
    }
}
