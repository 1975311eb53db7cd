//! HTTP client for the Plockly identity service.
//!
//! This module implements the five credential lifecycle endpoints
//! (login, signup, refresh, logout, profile) over JSON. The session
//! manager consumes them through the `IdentityApi` trait so tests can
//! substitute a scripted double for the live service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::auth::TokenPair;
use crate::models::User;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Successful login/signup payload: the user snapshot plus the token
/// pair that authenticates it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// The identity-service operations the session manager depends on.
#[async_trait]
pub trait IdentityApi {
    /// Exchange email/password for a user snapshot and token pair.
    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError>;

    /// Create an account; the service logs the new user straight in.
    async fn signup(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<AuthPayload, ApiError>;

    /// Mint a new access token from a refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError>;

    /// Blacklist a refresh token server-side. The endpoint requires the
    /// bearer access token as well as the refresh token in the body.
    async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), ApiError>;

    /// Fetch the profile behind an access token; doubles as the token
    /// validity probe during startup restoration.
    async fn profile(&self, access_token: &str) -> Result<User, ApiError>;
}

/// Identity service client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
}

impl IdentityClient {
    /// Create a client for the service at `base_url` (scheme + host,
    /// with or without a trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/auth/{}/", self.base_url, name)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {} response: {}", what, e)))
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        let url = self.endpoint("login");
        debug!(%url, "Sending login request");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response, "login").await
    }

    async fn signup(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<AuthPayload, ApiError> {
        let url = self.endpoint("signup");
        debug!(%url, "Sending signup request");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "email": email,
                "password": password,
                "password_confirm": password_confirm,
            }))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response, "signup").await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let url = self.endpoint("refresh");
        debug!(%url, "Sending token refresh request");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "refresh": refresh_token }))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let parsed: RefreshResponse = Self::parse(response, "refresh").await?;
        Ok(parsed.access)
    }

    async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), ApiError> {
        let url = self.endpoint("logout");
        debug!(%url, "Sending logout request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn profile(&self, access_token: &str) -> Result<User, ApiError> {
        let url = self.endpoint("profile");
        debug!(%url, "Fetching profile");

        let response = self.client.get(&url).bearer_auth(access_token).send().await?;

        let response = Self::check_response(response).await?;
        Self::parse(response, "profile").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_urls_without_double_slashes() {
        let client = IdentityClient::new("http://localhost:8000/").expect("client should build");
        assert_eq!(client.endpoint("login"), "http://localhost:8000/api/auth/login/");

        let client = IdentityClient::new("https://api.plockly.com").expect("client should build");
        assert_eq!(
            client.endpoint("refresh"),
            "https://api.plockly.com/api/auth/refresh/"
        );
    }

    #[test]
    fn parses_auth_payload_ignoring_message() {
        // Login and signup responses carry a human-readable "message"
        // alongside the user and tokens; only the latter two matter here.
        let json = r#"{
            "user": {
                "id": 3,
                "username": "a@b.com",
                "email": "a@b.com",
                "is_active": true,
                "date_joined": "2025-10-20T18:02:11Z"
            },
            "tokens": {
                "access": "acc.jwt.token",
                "refresh": "ref.jwt.token"
            },
            "message": "Login successful!"
        }"#;

        let payload: AuthPayload = serde_json::from_str(json).expect("auth payload should parse");
        assert_eq!(payload.user.email, "a@b.com");
        assert_eq!(payload.tokens.access, "acc.jwt.token");
        assert_eq!(payload.tokens.refresh, "ref.jwt.token");
    }

    #[test]
    fn parses_refresh_response() {
        let json = r#"{"access": "new.jwt.token", "message": "Token refreshed successfully!"}"#;
        let parsed: RefreshResponse = serde_json::from_str(json).expect("refresh response should parse");
        assert_eq!(parsed.access, "new.jwt.token");
    }
}
