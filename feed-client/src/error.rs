use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Not logged in")]
    MissingToken,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ClientError {
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        match resp.text().await {
            Ok(body) => Self::from_status(status, &body),
            Err(err) => Self::RequestError(err),
        }
    }

    /// Maps a failed response to an error, preferring the server's message.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|body| body.error)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            s if s.is_client_error() => Self::InvalidRequest(message),
            s => Self::Server {
                status: s.as_u16(),
                message,
            },
        }
    }
}
