// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! HTTP cloud adapter
//!
//! Blocking ureq calls; the supervisor never overlaps requests for the
//! same session, so there is nothing to gain from an async client here.

use super::{CloudAdapter, CloudError};
use async_trait::async_trait;
use perch_core::{FeederSnapshot, FeederState, SessionTokens, WatchSession};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct FeederListResponse {
    feeders: Vec<WireFeeder>,
}

#[derive(Deserialize)]
struct WireFeeder {
    id: String,
    name: String,
    state: String,
    battery: WireBattery,
}

#[derive(Deserialize)]
struct WireBattery {
    percentage: u8,
}

#[derive(Deserialize)]
struct WatchResponse {
    watching: WatchingBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchingBody {
    stream_url: Option<String>,
}

/// Cloud adapter over the HTTP API
#[derive(Clone)]
pub struct HttpCloudAdapter {
    api_url: String,
    credentials: Option<(String, String)>,
    tokens: Arc<Mutex<Option<SessionTokens>>>,
}

impl HttpCloudAdapter {
    /// Create an adapter. `cached` tokens (from the state store) are
    /// tried before falling back to a username/password login.
    pub fn new(
        api_url: &str,
        credentials: Option<(String, String)>,
        cached: Option<SessionTokens>,
    ) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
            tokens: Arc::new(Mutex::new(cached)),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn access_token(&self) -> Result<String, CloudError> {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or_else(|| CloudError::Auth("no active session".to_string()))
    }

    fn store_tokens(&self, response: TokenResponse) -> SessionTokens {
        let tokens = SessionTokens {
            refresh_token: response.refresh_token,
            access_token: response.access_token,
        };
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = Some(tokens.clone());
        tokens
    }

    fn login(&self) -> Result<SessionTokens, CloudError> {
        let (username, password) = self
            .credentials
            .as_ref()
            .ok_or_else(|| CloudError::Auth("no cached session and no credentials".to_string()))?;

        let mut response = ureq::post(&self.endpoint("/auth/login"))
            .send_json(serde_json::json!({
                "email": username,
                "password": password,
            }))
            .map_err(|e| CloudError::Auth(e.to_string()))?;

        let body: TokenResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| CloudError::Api(e.to_string()))?;
        Ok(self.store_tokens(body))
    }

    fn refresh_with_token(&self, refresh_token: &str) -> Result<SessionTokens, CloudError> {
        let mut response = ureq::post(&self.endpoint("/auth/refresh"))
            .send_json(serde_json::json!({ "refreshToken": refresh_token }))
            .map_err(|e| CloudError::Auth(e.to_string()))?;

        let body: TokenResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| CloudError::Api(e.to_string()))?;
        Ok(self.store_tokens(body))
    }
}

#[async_trait]
impl CloudAdapter for HttpCloudAdapter {
    async fn refresh(&self) -> Result<SessionTokens, CloudError> {
        let cached_refresh = self
            .tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|t| t.refresh_token.clone());

        match cached_refresh {
            Some(refresh_token) => match self.refresh_with_token(&refresh_token) {
                Ok(tokens) => Ok(tokens),
                // Expired refresh token: fall back to a credential login
                Err(e) if self.credentials.is_some() => {
                    tracing::warn!(error = %e, "token refresh failed, re-authenticating");
                    self.login()
                }
                Err(e) => Err(e),
            },
            None => self.login(),
        }
    }

    async fn list_feeders(&self) -> Result<Vec<FeederSnapshot>, CloudError> {
        let token = self.access_token()?;
        let mut response = ureq::get(&self.endpoint("/feeders"))
            .header("authorization", &format!("Bearer {}", token))
            .call()
            .map_err(|e| CloudError::Network(e.to_string()))?;

        let body: FeederListResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| CloudError::Api(e.to_string()))?;

        Ok(body
            .feeders
            .into_iter()
            .map(|f| FeederSnapshot {
                id: f.id,
                name: f.name,
                state: FeederState::from_wire(&f.state),
                battery_percentage: f.battery.percentage,
            })
            .collect())
    }

    async fn start_watching(&self, feeder_id: &str) -> Result<WatchSession, CloudError> {
        let token = self.access_token()?;
        let mut response = ureq::post(&self.endpoint(&format!("/feeders/{}/watch", feeder_id)))
            .header("authorization", &format!("Bearer {}", token))
            .send_json(serde_json::json!({}))
            .map_err(|e| CloudError::Network(e.to_string()))?;

        let body: WatchResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| CloudError::Api(e.to_string()))?;

        Ok(WatchSession {
            stream_url: body.watching.stream_url,
        })
    }

    async fn keep_alive(&self) -> Result<(), CloudError> {
        let token = self.access_token()?;
        ureq::post(&self.endpoint("/watch/keep-alive"))
            .header("authorization", &format!("Bearer {}", token))
            .send_json(serde_json::json!({}))
            .map_err(|e| CloudError::Network(e.to_string()))?;
        Ok(())
    }
}
