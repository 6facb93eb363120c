//! OAuth client for the device platform.

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::TrmnlError;
use super::types::{Account, TokenResponse};

const DEFAULT_AUTHORIZE_URL: &str = "https://usetrmnl.com/api/oauth/authorize";
const DEFAULT_TOKEN_URL: &str = "https://usetrmnl.com/api/oauth/token";
const DEFAULT_API_BASE_URL: &str = "https://usetrmnl.com/api/";
const DEFAULT_SCOPE: &str = "read write";

/// Configuration for the device platform client.
#[derive(Clone)]
pub struct TrmnlConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    /// Base for API calls; must end in `/`
    pub api_base_url: String,
    pub scope: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TrmnlConfig {
    /// Production endpoints with the given client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            timeout_secs: 10,
        }
    }

    /// Point every endpoint at another host (for testing).
    pub fn with_host(mut self, host: &str) -> Self {
        let host = host.trim_end_matches('/');
        self.authorize_url = format!("{host}/api/oauth/authorize");
        self.token_url = format!("{host}/api/oauth/token");
        self.api_base_url = format!("{host}/api/");
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for TrmnlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrmnlConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Device platform OAuth client.
#[derive(Debug, Clone)]
pub struct TrmnlClient {
    http: reqwest::Client,
    config: TrmnlConfig,
}

impl TrmnlClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TrmnlConfig) -> Result<Self, TrmnlError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// The URL to send a user to so they can grant access.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<Url, TrmnlError> {
        Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", self.config.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| TrmnlError::Url(e.to_string()))
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, TrmnlError> {
        debug!("exchanging authorization code");

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        read_json(response).await
    }

    /// Look up the account that granted `access_token`.
    pub async fn account(&self, access_token: &str) -> Result<Account, TrmnlError> {
        let url = Url::parse(&self.config.api_base_url)
            .and_then(|base| base.join("account"))
            .map_err(|e| TrmnlError::Url(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TrmnlError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TrmnlError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| TrmnlError::Json {
        message: e.to_string(),
    })
}
