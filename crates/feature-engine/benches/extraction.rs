use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{FeatureExtractor, FeatureTable, Label};
use load_profile::{DailyReshaper, RawSeries, ReshapeConfig};

/// One summer season of synthetic half-hourly readings
fn season() -> RawSeries {
    let start = NaiveDate::from_ymd_opt(2013, 12, 1).unwrap();
    let mut series = RawSeries::new("bench", Vec::new());
    for d in 0..90 {
        let date = start + Duration::days(d);
        for slot in 0..48 {
            let solar = if (14..36).contains(&slot) { -0.4 } else { 0.0 };
            let value = 0.3 + 0.01 * ((slot * 7 + d as usize) % 13) as f64 + solar;
            series.push(date, slot, Some(value));
        }
    }
    series
}

fn bench_extraction(c: &mut Criterion) {
    let series = season();
    let reshaper = DailyReshaper::new(ReshapeConfig::default());
    let extractor = FeatureExtractor::default();

    c.bench_function("reshape_season", |b| {
        b.iter(|| reshaper.reshape(black_box(&series)).unwrap())
    });

    let matrix = reshaper.reshape(&series).unwrap();
    c.bench_function("extract_season", |b| {
        b.iter(|| extractor.extract(black_box(&matrix)).unwrap())
    });

    c.bench_function("table_of_100_households", |b| {
        b.iter(|| {
            let mut table = FeatureTable::with_catalogue();
            for i in 0..100 {
                let features = extractor.extract(&matrix).unwrap();
                let label = if i % 2 == 0 { Label::Pv } else { Label::NonPv };
                table.push(format!("h{}", i), &features, label).unwrap();
            }
            table
        })
    });
}

criterion_group!(benches, bench_extraction);
criterion_main!(benches);
