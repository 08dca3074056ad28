//! ECG Backend HTTP Client
//!
//! Thin JSON client for the three backend endpoints. There is no retry,
//! no timeout, and no auth header: the user identifier travels as a query
//! parameter on each data request.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};

use crate::error::ApiError;
use crate::model::{
    ecg_data_path, AuthResponse, Credentials, EcgDataResponse, Sample, LOGIN_PATH, REGISTER_PATH,
};
use crate::session::UserId;

/// HTTP client bound to one backend
#[derive(Debug, Clone)]
pub struct EcgClient {
    client: Client,
    base_url: String,
}

impl EcgClient {
    /// Create a client for the given base URL
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            // Normalize: remove trailing slash
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/login`
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(credentials)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(AuthResponse::from_body(&response.text().await?))
    }

    /// `POST /api/register`
    ///
    /// A rejected registration that still carries `{message}` is returned as
    /// `Ok` so the message can be shown verbatim.
    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let response = self
            .client
            .post(self.url(REGISTER_PATH))
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(AuthResponse::from_body(&response.text().await?));
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<AuthResponse>(&text) {
            Ok(body) if body.message().is_some() => Ok(body),
            _ => Err(ApiError::Status {
                status: status.as_u16(),
                message: text,
            }),
        }
    }

    /// `GET /api/ecg-data?user_id=<id>`
    pub async fn fetch_ecg_data(&self, user_id: &UserId) -> Result<Vec<Sample>, ApiError> {
        let response = self
            .client
            .get(self.url(&ecg_data_path(user_id.as_str())))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let body: EcgDataResponse = response.json().await?;

        tracing::debug!(user_id = %user_id, samples = body.data.len(), "Fetched ECG data");
        Ok(body.data)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: text,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{spawn, Stub};
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = EcgClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url(LOGIN_PATH), "http://localhost:8000/api/login");
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let stub = Arc::new(Stub::default().with_login(StatusCode::OK, json!({ "user_id": "42" })));
        let base = spawn(stub.clone()).await;
        let client = EcgClient::new(&base).unwrap();

        let resp = client.login(&Credentials::new("a", "b")).await.unwrap();

        assert_eq!(resp.user_id(), Some("42"));
        assert_eq!(
            stub.last_credentials.lock().unwrap().clone(),
            Some(json!({ "login": "a", "password": "b" }))
        );
    }

    #[tokio::test]
    async fn test_login_non_success_is_error() {
        let stub = Arc::new(Stub::default().with_login(StatusCode::UNAUTHORIZED, json!({})));
        let base = spawn(stub).await;
        let client = EcgClient::new(&base).unwrap();

        let err = client.login(&Credentials::new("a", "b")).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_login_non_object_body_has_no_user_id() {
        let stub = Arc::new(Stub::default().with_login(StatusCode::OK, json!("Welcome")));
        let base = spawn(stub).await;
        let client = EcgClient::new(&base).unwrap();

        let resp = client.login(&Credentials::new("a", "b")).await.unwrap();
        assert_eq!(resp, AuthResponse::default());
    }

    #[tokio::test]
    async fn test_register_rejection_keeps_message() {
        let stub = Arc::new(
            Stub::default()
                .with_register(StatusCode::BAD_REQUEST, json!({ "message": "login taken" })),
        );
        let base = spawn(stub).await;
        let client = EcgClient::new(&base).unwrap();

        let resp = client.register(&Credentials::new("a", "b")).await.unwrap();
        assert_eq!(resp.message(), Some("login taken"));
        assert_eq!(resp.user_id(), None);
    }

    #[tokio::test]
    async fn test_register_server_error_without_message() {
        let stub = Arc::new(
            Stub::default().with_register(StatusCode::INTERNAL_SERVER_ERROR, json!({})),
        );
        let base = spawn(stub).await;
        let client = EcgClient::new(&base).unwrap();

        let err = client.register(&Credentials::new("a", "b")).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_passes_user_id_query() {
        let stub = Arc::new(Stub::default().with_ecg(
            StatusCode::OK,
            json!({ "data": [
                { "timestamp": "2024-01-01T00:00:02Z", "ecg_signal": 1.0 },
                { "timestamp": "2024-01-01T00:00:01Z", "ecg_signal": 0.5 }
            ]}),
            Duration::ZERO,
        ));
        let base = spawn(stub.clone()).await;
        let client = EcgClient::new(&base).unwrap();

        let samples = client
            .fetch_ecg_data(&UserId::new("user 42").unwrap())
            .await
            .unwrap();

        // Order is left to the display layer
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].ecg_signal, 1.0);
        assert_eq!(stub.last_user_id.lock().unwrap().as_deref(), Some("user 42"));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Nothing listens on port 9 locally
        let client = EcgClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .fetch_ecg_data(&UserId::new("42").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
