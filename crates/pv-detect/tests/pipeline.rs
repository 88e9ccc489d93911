use chrono::{Datelike, Duration, NaiveDate};
use classifier_bench::ClassifierKind;
use feature_engine::{EmptyWindowPolicy, ExtractorConfig, FeatureExtractor, Label};
use feature_ranker::FeatureRanker;
use load_profile::{DailyReshaper, RawSeries, ReshapeConfig};
use pv_detect::{
    build_table, read_labels, read_readings, render_text, run_pipeline, select_features,
    PipelineConfig,
};
use std::collections::HashMap;

#[test]
fn test_two_household_scenario() {
    let readings = "date,slot,A,B\n\
                    2014-01-06,0,1,10\n\
                    2014-01-06,1,2,20\n\
                    2014-01-06,2,3,30\n\
                    2014-01-06,3,4,40\n\
                    2014-01-07,0,5,\n\
                    2014-01-07,1,6,\n\
                    2014-01-07,2,7,\n\
                    2014-01-07,3,8,\n";
    let labels = read_labels("household,label\nA,0\nB,1\n".as_bytes()).unwrap();
    assert_eq!(labels["A"], Label::Pv);
    assert_eq!(labels["B"], Label::NonPv);

    let series = read_readings(readings.as_bytes()).unwrap();
    let reshaper = DailyReshaper::new(ReshapeConfig { num_obs: 4 });
    let a = reshaper.reshape(&series[0]).unwrap();
    let b = reshaper.reshape(&series[1]).unwrap();
    assert_eq!((a.num_days(), a.num_obs()), (2, 4));
    assert_eq!((b.num_days(), b.num_obs()), (1, 4));

    let extractor = FeatureExtractor::new(ExtractorConfig {
        morning_start: 1,
        afternoon_end: 3,
        empty_window: EmptyWindowPolicy::Nan,
    });
    let features = extractor.extract(&a).unwrap();
    assert_eq!(features.len(), 63);
    assert!((features.get("all_days_all_mean").unwrap() - 4.5).abs() < 1e-12);

    let features = extractor.extract(&b).unwrap();
    assert!((features.get("all_days_all_mean").unwrap() - 25.0).abs() < 1e-12);
}

/// Households over two weeks; PV ones export around midday
fn synthetic(households: usize) -> (Vec<RawSeries>, HashMap<String, Label>) {
    let start = NaiveDate::from_ymd_opt(2014, 1, 6).unwrap();
    let mut series = Vec::new();
    let mut labels = HashMap::new();
    for h in 0..households {
        let name = format!("house-{:02}", h);
        let pv = h % 2 == 0;
        let mut s = RawSeries::new(name.clone(), Vec::new());
        for d in 0..14 {
            let date = start + Duration::days(d as i64);
            for slot in 0..48 {
                let noise = ((h * 31 + d * 17 + slot * 7) % 23) as f64 * 0.02;
                let base = 0.3 + 0.01 * h as f64 + noise;
                let solar = if pv && (16..34).contains(&slot) {
                    0.5 + 0.01 * h as f64
                } else {
                    0.0
                };
                s.push(date, slot, Some(base - solar));
            }
        }
        series.push(s);
        labels.insert(name, if pv { Label::Pv } else { Label::NonPv });
    }
    (series, labels)
}

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.benchmark.seed = Some(5);
    config.benchmark.max_iterations = 300;
    config
}

#[test]
fn test_full_pipeline_reports_every_family() {
    let (series, labels) = synthetic(40);
    let report = run_pipeline(&config(), &series, &labels).unwrap();

    assert_eq!(report.households, 40);
    assert!(report.skipped.is_empty());
    assert_eq!(report.selected.len(), 12);
    assert!(report
        .selected
        .windows(2)
        .all(|w| w[0].p_value <= w[1].p_value));

    let b = &report.benchmark;
    assert_eq!(b.train_rows + b.test_rows, 40);
    let kinds: Vec<ClassifierKind> = b.scores.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, ClassifierKind::ALL.to_vec());
    for score in &b.scores {
        if let Ok(s) = &score.outcome {
            assert!((0.0..=1.0).contains(&s.accuracy));
        }
    }
}

#[test]
fn test_same_seed_same_report() {
    let (series, labels) = synthetic(30);
    let first = run_pipeline(&config(), &series, &labels).unwrap();
    let second = run_pipeline(&config(), &series, &labels).unwrap();
    assert_eq!(first.benchmark, second.benchmark);
    assert_eq!(first.selected, second.selected);
}

#[test]
fn test_unlabelled_and_broken_households_are_skipped() {
    let (mut series, mut labels) = synthetic(4);
    labels.remove("house-01");
    // Slot 48 is outside a half-hourly day
    series[2].push(NaiveDate::from_ymd_opt(2014, 1, 6).unwrap(), 48, Some(1.0));

    let (table, skipped) = build_table(&config(), &series, &labels).unwrap();
    assert_eq!(table.len(), 2);
    let names: Vec<&str> = skipped.iter().map(|s| s.household.as_str()).collect();
    assert_eq!(names, vec!["house-01", "house-02"]);
}

#[test]
fn test_household_with_undefined_features_is_skipped() {
    let (mut series, labels) = synthetic(6);
    // No weekend days leaves every weekend feature undefined
    series[3]
        .readings
        .retain(|r| r.date.weekday().number_from_monday() <= 5);
    let mut config = config();
    config.extractor.empty_window = EmptyWindowPolicy::Nan;

    let (table, skipped) = build_table(&config, &series, &labels).unwrap();
    assert_eq!(table.len(), 5);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].household, "house-03");
    assert!(skipped[0].reason.starts_with("undefined features"));
    assert!(table.features().iter().all(|v| v.is_finite()));
}

#[test]
fn test_nan_policy_run_survives_incomplete_household() {
    let (mut series, labels) = synthetic(40);
    series[7]
        .readings
        .retain(|r| r.date.weekday().number_from_monday() <= 5);
    let mut config = config();
    config.extractor.empty_window = EmptyWindowPolicy::Nan;

    let report = run_pipeline(&config, &series, &labels).unwrap();
    assert_eq!(report.households, 39);
    assert_eq!(report.skipped.len(), 1);
}

#[test]
fn test_features_ranked_on_training_households_only() {
    let (series, labels) = synthetic(40);
    let config = config();
    let (table, _) = build_table(&config, &series, &labels).unwrap();
    let (train, test) = table
        .split(config.input.test_fraction, config.input.split_seed)
        .unwrap();

    let ranker = FeatureRanker::new(config.ranker.clone());
    let (selected, train_cols, test_cols) = select_features(&ranker, &train, &test).unwrap();
    let from_train = ranker.rank(&train).unwrap();
    assert_eq!(selected, from_train.entries()[..selected.len()].to_vec());
    assert_eq!(train_cols.names(), test_cols.names());
    assert_eq!(train_cols.len(), train.len());
    assert_eq!(test_cols.len(), test.len());

    // Ranking over every household gives different p-values
    let from_all = ranker.rank(&table).unwrap();
    assert_ne!(from_all.p_value(&selected[0].name), Some(selected[0].p_value));

    let report = run_pipeline(&config, &series, &labels).unwrap();
    assert_eq!(report.selected, selected);
}

#[test]
fn test_render_text_lists_every_family() {
    let (series, labels) = synthetic(30);
    let report = run_pipeline(&config(), &series, &labels).unwrap();
    let text = render_text(&report);
    assert!(text.starts_with("Households: 30 used, 0 skipped"));
    for kind in ClassifierKind::ALL {
        assert!(text.contains(kind.name()));
    }
    assert_eq!(text.lines().filter(|l| l.contains("p=")).count(), report.selected.len());
}
