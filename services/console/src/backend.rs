//! HTTP client for the key-management backend
//!
//! Sign-in and registration return a bearer token; every later call carries
//! it in the `Authorization` header. The backend validates that token on
//! every request, so it is the only party that decides whether a session is
//! genuine.

use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::dashboard::Role;
use crate::forms::{LoginForm, RegisterForm};

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Errors returned by the backend client
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport failure or undecodable body
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// The backend accepted the request but sent no token
    #[error("Backend response did not include a token")]
    MissingToken,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Client for the backend REST API
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sign in and return the issued token
    pub async fn login(&self, role: Role, form: &LoginForm) -> Result<String, BackendError> {
        info!("Login attempt for {} account {}", role, form.email);

        let response = self
            .http
            .post(self.url(&format!("{}/login", role)))
            .json(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response, LOGIN_FAILED).await);
        }

        token_from(response).await
    }

    /// Register an account and return the issued token
    ///
    /// Only a `200 OK` counts as a successful registration.
    pub async fn register(&self, role: Role, form: &RegisterForm) -> Result<String, BackendError> {
        info!("Registration attempt for {} account {}", role, form.email);

        let response = self
            .http
            .post(self.url(&format!("{}/register", role)))
            .json(form)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(rejected(response, REGISTRATION_FAILED).await);
        }

        token_from(response).await
    }

    /// `GET` a JSON resource on behalf of the session
    pub async fn get_authorized(&self, path: &str, token: &str) -> Result<Value, BackendError> {
        let response = self
            .http
            .get(self.url(path))
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = rejected(response, "Request failed").await;
            error!("Authorized request to {} failed: {}", path, err);
            return Err(err);
        }

        Ok(response.json().await?)
    }
}

async fn token_from(response: reqwest::Response) -> Result<String, BackendError> {
    let body: TokenResponse = response.json().await?;
    body.token
        .filter(|token| !token.is_empty())
        .ok_or(BackendError::MissingToken)
}

async fn rejected(response: reqwest::Response, fallback: &str) -> BackendError {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| fallback.to_string());

    BackendError::Rejected { status, message }
}
