//! Benchmark Orchestration

use crate::models::{accuracy, ClassifierKind, TrainSettings};
use crate::pca::Pca;
use crate::{BenchmarkError, TrainingError};
use feature_engine::{FeatureTable, Label};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Principal components the classifiers see
const PROJECTION_DIMENSIONS: usize = 2;

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Folds used to tune each classifier
    pub cv_folds: usize,
    /// Fixes shuffling and fold assignment; `None` draws from the OS
    pub seed: Option<u64>,
    /// Train the classifiers on the rayon pool
    pub parallel: bool,
    pub max_iterations: usize,
    pub learning_rate: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        let settings = TrainSettings::default();
        Self {
            cv_folds: 10,
            seed: None,
            parallel: false,
            max_iterations: settings.max_iterations,
            learning_rate: settings.learning_rate,
        }
    }
}

impl BenchmarkConfig {
    fn train_settings(&self) -> TrainSettings {
        TrainSettings {
            max_iterations: self.max_iterations,
            learning_rate: self.learning_rate,
        }
    }
}

/// Held-out result of one tuned classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    /// Share of test rows labelled correctly, in `[0, 1]`
    pub accuracy: f64,
    /// Hyperparameter chosen by cross-validation
    pub hyperparameter: Option<f64>,
    pub cv_accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierScore {
    pub kind: ClassifierKind,
    pub outcome: Result<Score, TrainingError>,
}

/// Results of one benchmark run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    /// One entry per classifier family, in [`ClassifierKind::ALL`] order
    pub scores: Vec<ClassifierScore>,
    /// Variance share of each principal component
    pub explained_variance_ratio: Vec<f64>,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl BenchmarkReport {
    /// Accuracy of one family, if it trained
    pub fn accuracy(&self, kind: ClassifierKind) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.kind == kind)
            .and_then(|s| s.outcome.as_ref().ok())
            .map(|s| s.accuracy)
    }
}

/// Compares the classifier families on a PCA projection of labelled tables
#[derive(Debug, Clone, Default)]
pub struct ClassificationBenchmark {
    config: BenchmarkConfig,
}

impl ClassificationBenchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Project, tune, train and score every classifier family.
    ///
    /// A family that fails to train is reported with its error; only
    /// problems with the tables themselves fail the run.
    pub fn evaluate(
        &self,
        train: &FeatureTable,
        test: &FeatureTable,
    ) -> Result<BenchmarkReport, BenchmarkError> {
        if test.width() != train.width() {
            return Err(BenchmarkError::ColumnMismatch {
                expected: train.width(),
                actual: test.width(),
            });
        }
        if test.is_empty() {
            return Err(BenchmarkError::EmptyTestSet);
        }
        let folds = self.config.cv_folds;
        if folds < 2 || folds > train.len() {
            return Err(BenchmarkError::InvalidFolds {
                folds,
                rows: train.len(),
            });
        }

        let pca = Pca::fit(train.features(), PROJECTION_DIMENSIONS)?;
        let train_x = pca.transform(train.features())?;
        let test_x = pca.transform(test.features())?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (train_x, train_y) = shuffled(train_x, train.labels(), &mut rng);
        let (test_x, test_y) = shuffled(test_x, test.labels(), &mut rng);

        // One stream per family so scheduling cannot change results
        let jobs: Vec<(ClassifierKind, u64)> = ClassifierKind::ALL
            .iter()
            .map(|&kind| (kind, rng.gen()))
            .collect();

        let settings = self.config.train_settings();
        let run = |&(kind, seed): &(ClassifierKind, u64)| -> ClassifierScore {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = kind
                .train(train_x.view(), &train_y, folds, &settings, &mut rng)
                .and_then(|tuned| {
                    let predicted = tuned.classifier.predict(test_x.view())?;
                    Ok(Score {
                        accuracy: accuracy(&predicted, &test_y),
                        hyperparameter: tuned.hyperparameter,
                        cv_accuracy: tuned.cv_accuracy,
                    })
                });
            match &outcome {
                Ok(score) => info!("{}: accuracy {:.3}", kind, score.accuracy),
                Err(e) => warn!("{} failed: {}", kind, e),
            }
            ClassifierScore { kind, outcome }
        };

        let scores: Vec<ClassifierScore> = if self.config.parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        Ok(BenchmarkReport {
            scores,
            explained_variance_ratio: pca.explained_variance_ratio(),
            train_rows: train.len(),
            test_rows: test.len(),
        })
    }
}

/// Rows and labels in a seeded random order
fn shuffled(x: Array2<f64>, y: &[Label], rng: &mut StdRng) -> (Array2<f64>, Vec<Label>) {
    let mut order: Vec<usize> = (0..y.len()).collect();
    order.shuffle(rng);
    let labels = order.iter().map(|&i| y[i]).collect();
    (x.select(Axis(0), &order), labels)
}
