use anyhow::{Context, Result};
use reqwest::Client;
use std::env;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use vaxticker::{
    config::Config,
    fetch::HttpSource,
    history,
    job::Job,
    publish::TwitterPublisher,
};

/// One scheduled invocation: report every day the source published since
/// the last run, then exit.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) environment & logging ────────────────────────────────────
    let dotenv = dotenvy::dotenv();
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("").add_directive(log_level.parse().unwrap_or(Level::INFO.into()))
    });
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }
    info!("startup");

    // ─── 2) configuration & clients ──────────────────────────────────
    let config = Config::from_env().context("reading configuration")?;
    let client = Client::builder()
        .user_agent(concat!("vaxticker/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    let store = history::open(&config.source.store)
        .await
        .context("opening cursor store")?;
    let source = HttpSource::new(client.clone(), config.source.source_url.clone());
    let publisher = TwitterPublisher::new(
        client,
        config.credentials.clone(),
        config.tweet_endpoint.clone(),
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    let job = Job::new(Box::new(source), store, Box::new(publisher));
    match job.run().await {
        Ok(summary) => {
            info!(
                mode = ?summary.mode,
                published = summary.published.len(),
                cursor = ?summary.cursor,
                "done"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "invocation failed");
            Err(e.into())
        }
    }
}
