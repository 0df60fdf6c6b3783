use crate::application::ClientConfig;
use crate::infrastructure::error::StoreError;
use crate::infrastructure::store::{JoinOutcome, MembershipStore};
use async_trait::async_trait;
use live_lobby_core::{JoinRequest, LobbyId, Participant, StartRequest, UserId};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde_json::Value;

/// Membership store reached over REST
#[derive(Debug, Clone)]
pub struct HttpMembershipStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMembershipStore {
    pub fn new(config: &ClientConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| StoreError::InvalidConfig(format!("auth token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn participants_url(&self, lobby: &LobbyId) -> String {
        format!("{}/lobbies/{}/participants", self.base_url, lobby)
    }
}

async fn unexpected(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Status { status, body }
}

/// Accept a bare list or an object wrapping one
fn participants_from(body: Value) -> Result<Vec<Participant>, StoreError> {
    let list = match body {
        Value::Array(items) => Value::Array(items),
        Value::Object(fields) => fields
            .into_iter()
            .map(|(_, v)| v)
            .find(Value::is_array)
            .ok_or_else(|| StoreError::Decode("no participant list in response".to_string()))?,
        other => {
            return Err(StoreError::Decode(format!(
                "expected a participant list, got {}",
                other
            )))
        }
    };

    serde_json::from_value(list).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl MembershipStore for HttpMembershipStore {
    async fn join(&self, lobby: &LobbyId, request: &JoinRequest) -> Result<JoinOutcome, StoreError> {
        let url = self.participants_url(lobby);
        tracing::debug!("📤 POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        match response.status() {
            StatusCode::CONFLICT => Ok(JoinOutcome::AlreadyJoined),
            status if status.is_success() => Ok(JoinOutcome::Joined),
            _ => Err(unexpected(response).await),
        }
    }

    async fn list(&self, lobby: &LobbyId) -> Result<Vec<Participant>, StoreError> {
        let url = self.participants_url(lobby);
        tracing::debug!("📤 GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }

        let body: Value = response.json().await?;
        participants_from(body)
    }

    async fn leave(&self, lobby: &LobbyId, user: &UserId) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.participants_url(lobby), user);
        tracing::debug!("📤 DELETE {}", url);

        let response = self.client.delete(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            _ => Err(unexpected(response).await),
        }
    }

    async fn start(&self, lobby: &LobbyId, request: &StartRequest) -> Result<(), StoreError> {
        let url = format!("{}/lobbies/{}/start", self.base_url, lobby);
        tracing::debug!("📤 POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        match response.status() {
            StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Forbidden(body))
            }
            status if status.is_success() => Ok(()),
            _ => Err(unexpected(response).await),
        }
    }
}
