//! Show what the next scheduled run would post, without posting it or
//! moving the cursor. Reads the same `SOURCE_URL` / `REDIS_URL` /
//! `CURSOR_DIR` settings as the main job; no posting credentials needed.

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use vaxticker::{
    config::SourceConfig, fetch::HttpSource, history, job::plan, publish::format_message,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let config = SourceConfig::from_env().context("reading configuration")?;
    let store = history::open(&config.store)
        .await
        .context("opening cursor store")?;
    let source = HttpSource::new(Client::new(), config.source_url.clone());

    let batch = plan(&source, store.as_ref()).await?;
    info!(days = batch.days.len(), "dry run");

    if batch.is_empty() {
        println!("nothing to publish");
    }
    for day in &batch.days {
        println!("{}\n", format_message(day));
    }
    println!("{}", serde_json::to_string_pretty(&batch)?);
    Ok(())
}
