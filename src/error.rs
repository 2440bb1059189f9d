// src/error.rs

use chrono::NaiveDate;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::history::StoreError;
use crate::publish::PublishError;
use crate::stats::ParseError;

/// Everything that can abort one invocation of the job.
///
/// None of these are recovered locally: the invocation stops, the cursor is
/// left where it was, and the next scheduled run starts over.
#[derive(Debug, Error)]
pub enum Error {
    #[error("loading series: {0}")]
    Fetch(#[from] FetchError),

    #[error("extracting stats: {0}")]
    Parse(#[from] ParseError),

    /// The stored cursor does not name any day in the fetched series.
    #[error("cursor {cursor} not found in series covering {oldest}..={newest}")]
    CursorNotFound {
        cursor: NaiveDate,
        oldest: NaiveDate,
        newest: NaiveDate,
    },

    #[error("publishing {date}: {source}")]
    Publish {
        date: NaiveDate,
        #[source]
        source: PublishError,
    },

    #[error("cursor store: {0}")]
    Store(#[from] StoreError),
}
