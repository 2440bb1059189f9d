// src/fetch/series.rs

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, trace};

use super::FetchError;

/// Position of the ISO day in every record.
pub const DATE_COLUMN: usize = 0;
/// Cumulative share of the population with at least one dose.
pub const FIRST_COVERAGE_COLUMN: usize = 10;
/// Cumulative share of the population that is fully vaccinated.
pub const SECOND_COVERAGE_COLUMN: usize = 11;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column names a header row must carry at the positions we read.
const EXPECTED_HEADER: [(usize, &str); 3] = [
    (DATE_COLUMN, "date"),
    (FIRST_COVERAGE_COLUMN, "impf_quote_erst"),
    (SECOND_COVERAGE_COLUMN, "impf_quote_voll"),
];

const MIN_FIELDS: usize = SECOND_COVERAGE_COLUMN + 1;

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// One data record of the source table. Only the date is parsed up front;
/// the numeric fields stay as text until a stats extraction asks for them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line in the source document, for error reporting.
    pub line: u64,
    pub date: NaiveDate,
    fields: Vec<String>,
}

impl RawRow {
    pub fn new(line: u64, date: NaiveDate, fields: Vec<String>) -> Self {
        Self { line, date, fields }
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

/// The full table of daily observations, strictly ascending by date.
#[derive(Debug, Clone)]
pub struct Series {
    rows: Vec<RawRow>,
}

impl Series {
    /// Sort `rows` by date and check they form a usable series: no repeated
    /// day, and at least one row. Whether a day has the predecessor its
    /// delta needs is checked when days are selected.
    pub fn from_rows(mut rows: Vec<RawRow>) -> Result<Self, FetchError> {
        rows.sort_by_key(|r| r.date);
        if let Some(pair) = rows.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(FetchError::DuplicateDate { date: pair[0].date });
        }
        if rows.is_empty() {
            return Err(FetchError::TooShort {
                rows: 0,
                required: 1,
            });
        }
        Ok(Self { rows })
    }

    /// Parse a tab-separated document. A leading header row is recognised by
    /// its first field not being a date, and must name the columns we read.
    pub fn parse_tsv(bytes: &[u8]) -> Result<Self, FetchError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map_or(index as u64 + 1, |p| p.line());
            let first = record.get(DATE_COLUMN).unwrap_or_default();

            let Some(date) = parse_date(first) else {
                if index == 0 {
                    check_header(&record)?;
                    debug!(fields = record.len(), "skipping header row");
                    continue;
                }
                return Err(FetchError::InvalidDate {
                    line,
                    value: first.to_string(),
                });
            };

            if record.len() < MIN_FIELDS {
                return Err(FetchError::ShortRow {
                    line,
                    fields: record.len(),
                    required: MIN_FIELDS,
                });
            }

            trace!(line, %date, "row");
            rows.push(RawRow::new(
                line,
                date,
                record.iter().map(str::to_string).collect(),
            ));
        }

        Self::from_rows(rows)
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn oldest(&self) -> NaiveDate {
        self.rows[0].date
    }

    pub fn newest(&self) -> NaiveDate {
        self.rows[self.rows.len() - 1].date
    }
}

fn check_header(record: &StringRecord) -> Result<(), FetchError> {
    for (index, expected) in EXPECTED_HEADER {
        let found = record.get(index).unwrap_or_default().trim();
        if found != expected {
            return Err(FetchError::HeaderMismatch {
                index,
                expected,
                found: found.to_string(),
            });
        }
    }
    Ok(())
}
