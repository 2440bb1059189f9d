// src/stats.rs

use chrono::NaiveDate;
use serde::Serialize;
use std::num::ParseFloatError;
use thiserror::Error;

use crate::fetch::series::{FIRST_COVERAGE_COLUMN, SECOND_COVERAGE_COLUMN};
use crate::fetch::RawRow;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{date}: column {column} is missing")]
    MissingField { date: NaiveDate, column: usize },

    #[error("{date}: column {column} is not a number ({value:?}): {source}")]
    NotNumeric {
        date: NaiveDate,
        column: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Coverage of one day and its change against the previous row of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub first_coverage: f64,
    pub first_delta: f64,
    pub second_coverage: f64,
    pub second_delta: f64,
}

/// Turn a population fraction into a percentage with two decimals.
pub fn normalize(raw: f64) -> f64 {
    (raw * 10_000.0).round() / 100.0
}

fn coverage(row: &RawRow, column: usize) -> Result<f64, ParseError> {
    let value = row.field(column).ok_or(ParseError::MissingField {
        date: row.date,
        column,
    })?;
    let raw: f64 = value
        .trim()
        .parse()
        .map_err(|source| ParseError::NotNumeric {
            date: row.date,
            column,
            value: value.to_string(),
            source,
        })?;
    Ok(normalize(raw))
}

/// Build the stats for `row`. Deltas subtract the already rounded
/// percentages of `previous`, never the raw fractions.
pub fn extract(row: &RawRow, previous: &RawRow) -> Result<DayStats, ParseError> {
    let first_coverage = coverage(row, FIRST_COVERAGE_COLUMN)?;
    let second_coverage = coverage(row, SECOND_COVERAGE_COLUMN)?;
    let first_delta = first_coverage - coverage(previous, FIRST_COVERAGE_COLUMN)?;
    let second_delta = second_coverage - coverage(previous, SECOND_COVERAGE_COLUMN)?;

    Ok(DayStats {
        date: row.date,
        first_coverage,
        first_delta,
        second_coverage,
        second_delta,
    })
}
