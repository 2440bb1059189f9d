// src/publish/twitter.rs

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::AUTHORIZATION, Client};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use super::{oauth, PublishError, Publisher};
use crate::config::Credentials;

pub const DEFAULT_TWEET_ENDPOINT: &str = "https://api.twitter.com/2/tweets";

#[derive(Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreatedTweet {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

/// Posts each message as a tweet on the account behind `credentials`.
pub struct TwitterPublisher {
    client: Client,
    credentials: Credentials,
    endpoint: Url,
}

impl TwitterPublisher {
    pub fn new(client: Client, credentials: Credentials, endpoint: Url) -> Self {
        Self {
            client,
            credentials,
            endpoint,
        }
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    #[tracing::instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint))]
    async fn publish(&self, text: &str) -> Result<(), PublishError> {
        let auth = oauth::authorization_header(
            &self.credentials,
            "POST",
            &self.endpoint,
            &oauth::nonce(),
            Utc::now().timestamp(),
        );

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, auth)
            .json(&CreateTweet { text })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "tweet rejected");
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedTweet = resp.json().await?;
        info!(id = %created.data.id, "tweet posted");
        Ok(())
    }
}
