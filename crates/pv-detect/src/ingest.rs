//! CSV Ingest
//!
//! Readings arrive as a wide table, `date,slot,<household>...`, one row per
//! timestamp. An empty cell (or `NA`) is a missing reading; a household with
//! no readings on a date has no row for that date. Labels arrive as
//! `household,label`.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use feature_engine::Label;
use load_profile::RawSeries;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_value(cell: &str) -> Result<Option<f64>> {
    match cell {
        "" | "NA" | "na" | "NaN" => Ok(None),
        s => s
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("invalid reading '{}'", s)),
    }
}

/// Parse a wide readings table into one series per household
pub fn read_readings<R: Read>(reader: R) -> Result<Vec<RawSeries>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("failed to read CSV headers")?.clone();
    if headers.len() < 3 {
        bail!("expected 'date,slot,<household>...' headers, got {} columns", headers.len());
    }
    let households: Vec<String> = headers.iter().skip(2).map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut slots = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); households.len()];

    for (idx, record) in reader.records().enumerate() {
        // Line numbers are 1-based and the header is line 1
        let line = idx + 2;
        let record = record.with_context(|| format!("CSV parse error on line {}", line))?;
        if record.len() != headers.len() {
            bail!(
                "line {} has {} fields, expected {}",
                line,
                record.len(),
                headers.len()
            );
        }

        let date = NaiveDate::parse_from_str(&record[0], DATE_FORMAT)
            .with_context(|| format!("invalid date '{}' on line {}", &record[0], line))?;
        let slot = record[1]
            .parse::<usize>()
            .with_context(|| format!("invalid slot '{}' on line {}", &record[1], line))?;
        dates.push(date);
        slots.push(slot);
        for (column, cell) in columns.iter_mut().zip(record.iter().skip(2)) {
            column.push(parse_value(cell).with_context(|| format!("on line {}", line))?);
        }
    }

    let named: Vec<(String, Vec<Option<f64>>)> = households.into_iter().zip(columns).collect();
    let mut series = RawSeries::from_columns(&dates, &slots, &named)?;
    for s in &mut series {
        s.readings.retain(|r| r.value.is_some());
        debug!("Household {}: {} readings", s.household, s.len());
    }

    info!("Read {} timestamps for {} households", dates.len(), series.len());
    Ok(series)
}

#[derive(Debug, Deserialize)]
struct LabelRecord {
    household: String,
    label: String,
}

/// Parse a `household,label` table
pub fn read_labels<R: Read>(reader: R) -> Result<HashMap<String, Label>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut labels = HashMap::new();
    for record in reader.deserialize::<LabelRecord>() {
        let record = record.context("invalid label row")?;
        let label: Label = record
            .label
            .parse()
            .with_context(|| format!("household {}", record.household))?;
        if labels.insert(record.household.clone(), label).is_some() {
            bail!("household {} is labelled twice", record.household);
        }
    }
    Ok(labels)
}
