//! Pipeline Orchestration
//!
//! reshape -> extract -> split -> rank -> select -> benchmark
//!
//! Features are ranked on the training households only.

use crate::config::PipelineConfig;
use anyhow::{bail, Context, Result};
use classifier_bench::{BenchmarkReport, ClassificationBenchmark};
use feature_engine::{FeatureExtractor, FeatureTable, Label};
use feature_ranker::{FeatureImportance, FeatureRanker};
use load_profile::{DailyReshaper, RawSeries};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{self, Write};
use tracing::{info, warn};

/// A household left out of the run, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub household: String,
    pub reason: String,
}

/// Outcome of a full pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Households that reached the feature table
    pub households: usize,
    pub skipped: Vec<Skipped>,
    /// Features fed to the benchmark, most significant first
    pub selected: Vec<FeatureImportance>,
    pub benchmark: BenchmarkReport,
}

/// Build the labelled feature table, skipping households that cannot be
/// reshaped, extracted or labelled, or whose features are left undefined
pub fn build_table(
    config: &PipelineConfig,
    series: &[RawSeries],
    labels: &HashMap<String, Label>,
) -> Result<(FeatureTable, Vec<Skipped>)> {
    let reshaper = DailyReshaper::new(config.reshape.clone());
    let extractor = FeatureExtractor::new(config.extractor.clone());

    let mut table = FeatureTable::with_catalogue();
    let mut skipped = Vec::new();
    for s in series {
        let mut skip = |reason: String| {
            warn!("Skipping household {}: {}", s.household, reason);
            skipped.push(Skipped {
                household: s.household.clone(),
                reason,
            });
        };

        let Some(&label) = labels.get(&s.household) else {
            skip("no label".to_string());
            continue;
        };
        let matrix = match reshaper.reshape(s) {
            Ok(m) => m,
            Err(e) => {
                skip(e.to_string());
                continue;
            }
        };
        let features = match extractor.extract(&matrix) {
            Ok(f) => f,
            Err(e) => {
                skip(e.to_string());
                continue;
            }
        };
        if !features.is_complete() {
            skip(format!("undefined features: {}", features.undefined.join(", ")));
            continue;
        }
        table.push(s.household.clone(), &features, label)?;
    }

    info!(
        "Feature table: {} households, {} skipped",
        table.len(),
        skipped.len()
    );
    Ok((table, skipped))
}

/// Run every stage on already-ingested data
pub fn run_pipeline(
    config: &PipelineConfig,
    series: &[RawSeries],
    labels: &HashMap<String, Label>,
) -> Result<PipelineReport> {
    let (table, skipped) = build_table(config, series, labels)?;
    if table.is_empty() {
        bail!("no household produced a feature vector");
    }

    let (train, test) = table
        .split(config.input.test_fraction, config.input.split_seed)
        .context("train/test split failed")?;
    info!("Split {} train / {} test households", train.len(), test.len());

    let ranker = FeatureRanker::new(config.ranker.clone());
    let (selected, train, test) = select_features(&ranker, &train, &test)?;

    let benchmark = ClassificationBenchmark::new(config.benchmark.clone())
        .evaluate(&train, &test)
        .context("classification benchmark failed")?;

    Ok(PipelineReport {
        households: table.len(),
        skipped,
        selected,
        benchmark,
    })
}

/// Rank on `train` and keep the chosen columns in both tables
pub fn select_features(
    ranker: &FeatureRanker,
    train: &FeatureTable,
    test: &FeatureTable,
) -> Result<(Vec<FeatureImportance>, FeatureTable, FeatureTable)> {
    let ranking = ranker.rank(train).context("feature ranking failed")?;
    let columns = ranker.select(&ranking);
    let selected = ranking.entries()[..columns.len()].to_vec();
    Ok((selected, train.select(&columns)?, test.select(&columns)?))
}

/// Aligned plain-text rendering of a report
pub fn render_text(report: &PipelineReport) -> String {
    let mut out = String::new();
    // Writing into a String does not fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &PipelineReport) -> fmt::Result {
    writeln!(
        out,
        "Households: {} used, {} skipped",
        report.households,
        report.skipped.len()
    )?;

    writeln!(out, "\nSelected features:")?;
    for f in &report.selected {
        writeln!(out, "  {:<28} p={:.3e}", f.name, f.p_value)?;
    }

    let b = &report.benchmark;
    writeln!(
        out,
        "\nBenchmark ({} train / {} test, PC variance {:?}):",
        b.train_rows, b.test_rows, b.explained_variance_ratio
    )?;
    for score in &b.scores {
        match &score.outcome {
            Ok(s) => writeln!(out, "  {:<12} {:.3}", score.kind.name(), s.accuracy)?,
            Err(e) => writeln!(out, "  {:<12} failed: {}", score.kind.name(), e)?,
        }
    }
    Ok(())
}
