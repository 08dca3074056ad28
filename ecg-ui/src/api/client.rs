//! HTTP API Client
//!
//! Functions for communicating with the ECG backend from the browser.
//! Responses are returned as-is; deciding what they mean is left to the
//! shared `ecg_monitor` interpretation functions.

use gloo_net::http::{Request, Response};
use web_sys::AbortSignal;

use ecg_monitor::model::{
    ecg_data_path, EcgDataResponse, DEFAULT_API_BASE, LOGIN_PATH, REGISTER_PATH,
};
use ecg_monitor::{ApiError, AuthResponse, Credentials, Sample, UserId};

/// Local storage key for overriding the backend address
const API_URL_KEY: &str = "ecg_api_url";

/// Get the API base URL from local storage or use default
fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

fn url(path: &str) -> String {
    format!("{}{}", get_api_base(), path)
}

/// `POST /api/login`
pub async fn login(credentials: &Credentials) -> Result<AuthResponse, ApiError> {
    let response = Request::post(&url(LOGIN_PATH))
        .json(credentials)
        .map_err(|e| ApiError::Network(format!("Request build error: {}", e)))?
        .send()
        .await
        .map_err(network_error)?;

    let response = ensure_ok(response).await?;
    auth_body(response).await
}

/// `POST /api/register`
///
/// A rejected registration that still carries `{message}` comes back as
/// `Ok` so the text can be shown verbatim.
pub async fn register(credentials: &Credentials) -> Result<AuthResponse, ApiError> {
    let response = Request::post(&url(REGISTER_PATH))
        .json(credentials)
        .map_err(|e| ApiError::Network(format!("Request build error: {}", e)))?
        .send()
        .await
        .map_err(network_error)?;

    if response.ok() {
        return auth_body(response).await;
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<AuthResponse>(&text) {
        Ok(body) if body.message().is_some() => Ok(body),
        _ => Err(ApiError::Status {
            status,
            message: text,
        }),
    }
}

/// `GET /api/ecg-data?user_id=<id>`, cancellable through `signal`
pub async fn fetch_ecg_data(
    user_id: &UserId,
    signal: &AbortSignal,
) -> Result<Vec<Sample>, ApiError> {
    let result = Request::get(&url(&ecg_data_path(user_id.as_str())))
        .abort_signal(Some(signal))
        .send()
        .await;

    let response = match result {
        Ok(response) => response,
        Err(_) if signal.aborted() => return Err(ApiError::Aborted),
        Err(e) => return Err(network_error(e)),
    };

    let response = ensure_ok(response).await?;
    let body: EcgDataResponse = response.json().await.map_err(|e| {
        if signal.aborted() {
            ApiError::Aborted
        } else {
            ApiError::Parse(e.to_string())
        }
    })?;

    Ok(body.data)
}

/// Decode a 2xx login/register body; a non-object body has no `user_id`
async fn auth_body(response: Response) -> Result<AuthResponse, ApiError> {
    let text = response.text().await.map_err(network_error)?;
    Ok(AuthResponse::from_body(&text))
}

async fn ensure_ok(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }

    Err(ApiError::Status {
        status: response.status(),
        message: response.text().await.unwrap_or_default(),
    })
}

fn network_error(e: gloo_net::Error) -> ApiError {
    ApiError::Network(e.to_string())
}
