// src/fetch/mod.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use thiserror::Error;
use tracing::info;
use url::Url;

pub mod series;

pub use series::{RawRow, Series};

/// Published daily by the German federal vaccination dashboard.
pub const DEFAULT_SOURCE_URL: &str =
    "https://impfdashboard.de/static/data/germany_vaccinations_timeseries_v2.tsv";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed tab-separated data: {0}")]
    Tsv(#[from] csv::Error),

    #[error("header column {index} is {found:?}, expected {expected:?}")]
    HeaderMismatch {
        index: usize,
        expected: &'static str,
        found: String,
    },

    #[error("line {line}: {fields} fields, need at least {required}")]
    ShortRow {
        line: u64,
        fields: usize,
        required: usize,
    },

    #[error("line {line}: invalid date {value:?}")]
    InvalidDate { line: u64, value: String },

    #[error("day {date} appears more than once")]
    DuplicateDate { date: NaiveDate },

    /// Too few rows for what was asked of them: none at all, or a single
    /// row where a day-over-day delta is needed.
    #[error("series has {rows} data rows, need at least {required}")]
    TooShort { rows: usize, required: usize },
}

/// Anything that can hand over the whole series for one invocation.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn load(&self) -> Result<Series, FetchError>;
}

/// Fetches the series over HTTP on every call; nothing is cached.
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl SeriesSource for HttpSource {
    #[tracing::instrument(level = "info", skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<Series, FetchError> {
        let http = |source: reqwest::Error| FetchError::Http {
            url: self.url.to_string(),
            source,
        };

        let body = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(http)?
            .error_for_status()
            .map_err(http)?
            .bytes()
            .await
            .map_err(http)?;

        let series = Series::parse_tsv(&body)?;
        info!(
            rows = series.len(),
            oldest = %series.oldest(),
            newest = %series.newest(),
            "loaded series"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = "2021-06-01\t1\t2\t3\t4\t5\t6\t7\t8\t9\t0.10\t0.05\n\
                        2021-06-02\t1\t2\t3\t4\t5\t6\t7\t8\t9\t0.12\t0.06\n";

    fn source(server: &MockServer) -> HttpSource {
        let url = Url::parse(&format!("{}/static/data/series.tsv", server.uri())).unwrap();
        HttpSource::new(Client::new(), url)
    }

    #[tokio::test]
    async fn loads_series_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/static/data/series.tsv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .expect(1)
            .mount(&server)
            .await;

        let series = source(&server).load().await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.newest().to_string(), "2021-06-02");
    }

    #[tokio::test]
    async fn http_error_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source(&server).load().await.unwrap_err();
        match err {
            FetchError::Http { url, source } => {
                assert!(url.ends_with("/static/data/series.tsv"));
                assert_eq!(source.status().map(|s| s.as_u16()), Some(503));
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparsable_body_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = source(&server).load().await.unwrap_err();
        assert!(matches!(err, FetchError::HeaderMismatch { index: 0, .. }));
    }
}
