// src/job.rs

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info};

use crate::cursor::{select, Batch, RunMode};
use crate::error::Error;
use crate::fetch::SeriesSource;
use crate::history::{load_cursor, save_cursor, CursorStore};
use crate::publish::{format_message, Publisher};

/// What one successful invocation did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub published: Vec<NaiveDate>,
    /// The cursor after the run; unchanged when nothing was published.
    pub cursor: Option<NaiveDate>,
}

/// Load the series and the cursor and work out the pending batch. Only reads.
#[tracing::instrument(level = "info", skip_all)]
pub async fn plan(source: &dyn SeriesSource, store: &dyn CursorStore) -> Result<Batch, Error> {
    let series = source.load().await?;
    let cursor = load_cursor(store).await?;
    let batch = select(&series, cursor)?;
    info!(mode = ?batch.mode, days = batch.days.len(), "planned batch");
    Ok(batch)
}

pub struct Job {
    source: Box<dyn SeriesSource>,
    store: Box<dyn CursorStore>,
    publisher: Box<dyn Publisher>,
}

impl Job {
    pub fn new(
        source: Box<dyn SeriesSource>,
        store: Box<dyn CursorStore>,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        Self {
            source,
            store,
            publisher,
        }
    }

    /// Publish every pending day in order, then move the cursor to the last
    /// one. The first failed publish ends the run before the cursor is
    /// touched, so the next run starts from the same place.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<RunSummary, Error> {
        let batch = plan(self.source.as_ref(), self.store.as_ref()).await?;
        let previous = match batch.mode {
            RunMode::ColdStart => None,
            RunMode::Warm { since } => Some(since),
        };

        let Some(next) = batch.next_cursor() else {
            info!("cursor is up to date; nothing to publish");
            return Ok(RunSummary {
                mode: batch.mode,
                published: Vec::new(),
                cursor: previous,
            });
        };

        let mut published = Vec::with_capacity(batch.days.len());
        for day in &batch.days {
            let text = format_message(day);
            if let Err(source) = self.publisher.publish(&text).await {
                error!(
                    date = %day.date,
                    published = published.len(),
                    pending = batch.days.len() - published.len(),
                    error = %source,
                    "publish failed; cursor left unchanged"
                );
                return Err(Error::Publish {
                    date: day.date,
                    source,
                });
            }
            info!(date = %day.date, "published");
            published.push(day.date);
        }

        save_cursor(self.store.as_ref(), next).await?;
        info!(cursor = %next, "cursor advanced");

        Ok(RunSummary {
            mode: batch.mode,
            published,
            cursor: Some(next),
        })
    }
}
