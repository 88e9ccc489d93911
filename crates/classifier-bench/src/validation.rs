//! K-Fold Cross-Validation

use crate::models::{accuracy, Model, TrainSettings};
use crate::TrainingError;
use feature_engine::Label;
use ndarray::{ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Round-robin fold assignment over (already shuffled) rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folds {
    assignment: Vec<usize>,
    k: usize,
}

impl Folds {
    /// Assign row `i` to fold `i % k`
    pub fn round_robin(rows: usize, k: usize) -> Self {
        Self {
            assignment: (0..rows).map(|i| i % k.max(1)).collect(),
            k: k.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.k
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// (training rows, held-out rows) for one fold
    pub fn split(&self, fold: usize) -> (Vec<usize>, Vec<usize>) {
        let mut train = Vec::new();
        let mut held_out = Vec::new();
        for (row, &f) in self.assignment.iter().enumerate() {
            if f == fold {
                held_out.push(row);
            } else {
                train.push(row);
            }
        }
        (train, held_out)
    }
}

/// Pick the grid candidate with the best mean held-out accuracy.
///
/// Ties go to the earlier candidate. Folds whose training rows hold a single
/// class are left out of every mean. A candidate is dropped if any scored
/// fold fails to train; if all are dropped the last error is returned.
pub(crate) fn select_params<M: Model>(
    x: ArrayView2<'_, f64>,
    y: &[Label],
    folds: &Folds,
    settings: &TrainSettings,
    rng: &mut StdRng,
) -> Result<(M::Params, Option<f64>), TrainingError> {
    let grid = M::grid();
    if grid.len() == 1 {
        return Ok((grid[0], None));
    }

    let mut best: Option<(M::Params, f64)> = None;
    let mut last_error = TrainingError::SingleClass { model: M::NAME };

    'candidates: for params in grid {
        let mut total = 0.0;
        let mut scored = 0usize;
        for fold in 0..folds.len() {
            let (train, held_out) = folds.split(fold);
            if held_out.is_empty() {
                continue;
            }
            let y_train: Vec<Label> = train.iter().map(|&i| y[i]).collect();
            if !has_both_classes(&y_train) {
                debug!("{} fold {} has a single training class, not scored", M::NAME, fold);
                continue;
            }
            let x_train = x.select(Axis(0), &train);
            let x_held = x.select(Axis(0), &held_out);
            let y_held: Vec<Label> = held_out.iter().map(|&i| y[i]).collect();

            let mut fold_rng = StdRng::seed_from_u64(rng.gen());
            match M::fit(x_train.view(), &y_train, params, settings, &mut fold_rng) {
                Ok(model) => {
                    total += accuracy(&model.predict(x_held.view()), &y_held);
                    scored += 1;
                }
                Err(e) => {
                    debug!("{} candidate {:?} failed on fold {}: {}", M::NAME, params, fold, e);
                    last_error = e;
                    continue 'candidates;
                }
            }
        }
        if scored == 0 {
            continue;
        }

        let score = total / scored as f64;
        debug!("{} candidate {:?}: cv accuracy {:.4}", M::NAME, params, score);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((params, score));
        }
    }

    best.map(|(params, score)| (params, Some(score)))
        .ok_or(last_error)
}

fn has_both_classes(labels: &[Label]) -> bool {
    labels.contains(&Label::Pv) && labels.contains(&Label::NonPv)
}
