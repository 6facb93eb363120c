//! Transport API HTTP client.
//!
//! Provides async methods for fetching bus stop timetables and live train
//! departure boards. Credentials belong to each installation, so they are
//! passed per request rather than baked into the client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{ApiCredentials, AtcoCode, Crs};

use super::error::TransportApiError;
use super::types::{BusTimetable, TrainBoard};

/// Default base URL for Transport API.
const DEFAULT_BASE_URL: &str = "https://transportapi.com";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the Transport API client.
#[derive(Debug, Clone)]
pub struct TransportApiConfig {
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TransportApiConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for TransportApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }
}

/// Transport API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct TransportApiClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl TransportApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TransportApiConfig) -> Result<Self, TransportApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Get the timetable for a bus stop.
    pub async fn bus_timetable(
        &self,
        credentials: &ApiCredentials,
        stop: &AtcoCode,
    ) -> Result<BusTimetable, TransportApiError> {
        let url = bus_timetable_url(&self.base_url, stop);
        self.get_json(&url, credentials, &[("group", "no")]).await
    }

    /// Get the live departure board for a train station.
    pub async fn train_board(
        &self,
        credentials: &ApiCredentials,
        station: &Crs,
    ) -> Result<TrainBoard, TransportApiError> {
        let url = train_board_url(&self.base_url, station);
        self.get_json(
            &url,
            credentials,
            &[("darwin", "true"), ("train_status", "passenger")],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credentials: &ApiCredentials,
        extra: &[(&str, &str)],
    ) -> Result<T, TransportApiError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| TransportApiError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        debug!(url, "fetching board");

        let response = self
            .http
            .get(url)
            .query(&[
                ("app_id", credentials.app_id.as_str()),
                ("app_key", credentials.app_key.as_str()),
            ])
            .query(extra)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(TransportApiError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportApiError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| TransportApiError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

fn bus_timetable_url(base_url: &str, stop: &AtcoCode) -> String {
    format!("{}/v3/uk/bus/stop_timetables/{}.json", base_url, stop.as_str())
}

fn train_board_url(base_url: &str, station: &Crs) -> String {
    format!("{}/v3/uk/train/station/{}/live.json", base_url, station.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = TransportApiConfig::default()
            .with_base_url("http://localhost:8080")
            .with_timeout(60);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = TransportApiConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn client_creation_trims_trailing_slash() {
        let config = TransportApiConfig::default().with_base_url("http://localhost:8080/");
        let client = TransportApiClient::new(config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn urls() {
        let stop = AtcoCode::parse("450010441").unwrap();
        assert_eq!(
            bus_timetable_url("https://transportapi.com", &stop),
            "https://transportapi.com/v3/uk/bus/stop_timetables/450010441.json"
        );

        let station = Crs::parse("LST").unwrap();
        assert_eq!(
            train_board_url("https://transportapi.com", &station),
            "https://transportapi.com/v3/uk/train/station/LST/live.json"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let config = TransportApiConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(2);
        let client = TransportApiClient::new(config).unwrap();
        let creds = ApiCredentials {
            app_id: "id".into(),
            app_key: "key".into(),
        };

        let result = client
            .train_board(&creds, &Crs::parse("LST").unwrap())
            .await;
        assert!(matches!(result, Err(TransportApiError::Http(_))));
    }
}
