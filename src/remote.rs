use crate::errors::ClientError;
use crate::models::{ClearHistoryResponse, Joke, StatsSnapshot};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// The four operations of the remote joke service. Errors are returned to
/// the caller untouched and nothing is retried.
#[async_trait]
pub trait JokeApi: Send + Sync {
    async fn fetch_joke(&self, category: &str, language: &str) -> Result<Joke, ClientError>;
    async fn fetch_history(&self) -> Result<Vec<Joke>, ClientError>;
    async fn fetch_stats(&self) -> Result<StatsSnapshot, ClientError>;
    async fn clear_history(&self) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct HttpJokeClient {
    base_url: String,
    http: Client,
}

impl HttpJokeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::network)?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl JokeApi for HttpJokeClient {
    async fn fetch_joke(&self, category: &str, language: &str) -> Result<Joke, ClientError> {
        debug!(category, language, "requesting joke");
        let response = self
            .http
            .get(self.url("/get_joke"))
            .query(&[("category", category), ("language", language)])
            .send()
            .await?;
        decode(response).await
    }

    async fn fetch_history(&self) -> Result<Vec<Joke>, ClientError> {
        let response = self.http.get(self.url("/history")).send().await?;
        decode(response).await
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot, ClientError> {
        let response = self.http.get(self.url("/stats")).send().await?;
        decode(response).await
    }

    async fn clear_history(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/clear_history")).send().await?;
        let bytes = checked(response).await?;
        match serde_json::from_slice::<ClearHistoryResponse>(&bytes) {
            Ok(ClearHistoryResponse {
                status: Some(status),
            }) if status != "success" => Err(ClientError::Network(format!(
                "clear_history answered {status:?}"
            ))),
            _ => Ok(()),
        }
    }
}

async fn checked(response: Response) -> Result<Vec<u8>, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Network(format!(
            "{} answered {status}",
            response.url().path()
        )));
    }
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = checked(response).await?;
    serde_json::from_slice(&bytes).map_err(ClientError::decode)
}
