// src/cursor.rs

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::fetch::{FetchError, Series};
use crate::stats::{extract, DayStats};

/// How the batch was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunMode {
    /// No cursor was stored; only the newest day is reported.
    ColdStart,
    /// Everything after `since` is reported.
    Warm { since: NaiveDate },
}

/// The days one invocation has to publish, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    pub mode: RunMode,
    pub days: Vec<DayStats>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The value the cursor takes once every day in the batch is out.
    pub fn next_cursor(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }
}

/// Decide which days have not been reported yet and compute their stats.
///
/// Without a cursor only the newest day is selected. With a cursor the
/// series is walked backwards from the newest day until the cursor day is
/// met; every day passed on the way is selected. The walk is bounded by the
/// start of the series, and running off it means the cursor names a day the
/// series does not contain.
pub fn select(series: &Series, cursor: Option<NaiveDate>) -> Result<Batch, Error> {
    let rows = series.rows();

    let Some(since) = cursor else {
        // the newest day needs a predecessor for its delta
        let [.., previous, newest] = rows else {
            return Err(FetchError::TooShort {
                rows: rows.len(),
                required: 2,
            }
            .into());
        };
        let day = extract(newest, previous)?;
        return Ok(Batch {
            mode: RunMode::ColdStart,
            days: vec![day],
        });
    };

    let found = rows
        .iter()
        .enumerate()
        .rev()
        .find(|(_, row)| row.date == since)
        .map(|(pos, _)| pos);

    let Some(pos) = found else {
        return Err(Error::CursorNotFound {
            cursor: since,
            oldest: series.oldest(),
            newest: series.newest(),
        });
    };

    // `pos` is the cursor row, so every selected row has a predecessor.
    let days = (pos + 1..rows.len())
        .map(|i| extract(&rows[i], &rows[i - 1]))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(%since, selected = days.len(), "warm run");
    Ok(Batch {
        mode: RunMode::Warm { since },
        days,
    })
}
