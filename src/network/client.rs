//! Coordinator HTTP Client
//!
//! Typed wrapper over the coordinator's routes, used by agents.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::game::state::{Participant, RoundStatus, ShotReport};
use crate::network::protocol::{
    ErrorCode, ErrorResponse, StartResponse, TargetResponse, WinnerResponse,
};

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport or decode failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The coordinator answered with an error body.
    #[error("Coordinator rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status.
        status: StatusCode,
        /// Error code, if the body carried one.
        code: Option<ErrorCode>,
        /// Error message.
        message: String,
    },
}

impl ClientError {
    /// Error code of a rejection.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Rejected { code, .. } => *code,
            ClientError::Http(_) => None,
        }
    }
}

/// HTTP client for one coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoordinatorClient {
    /// Create a client for `base_url` (e.g. `http://server:8080`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Coordinator base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request an identity.
    pub async fn register(&self) -> Result<Participant, ClientError> {
        let response = self.client.get(self.url("/register")).send().await?;
        decode(response).await
    }

    /// Is the round active?
    pub async fn is_active(&self) -> Result<bool, ClientError> {
        let response = self.client.get(self.url("/start")).send().await?;
        let status: StartResponse = decode(response).await?;
        Ok(status.active)
    }

    /// Ask for a target for `name`.
    pub async fn target(&self, name: &str) -> Result<TargetResponse, ClientError> {
        let response = self
            .client
            .get(self.url("/cowboys"))
            .query(&[("name", name)])
            .send()
            .await?;
        decode(response).await
    }

    /// Report the result of a shot.
    pub async fn report_shot(&self, report: &ShotReport) -> Result<(), ClientError> {
        debug!("Reporting {} at {} health", report.name, report.health);
        let response = self.client.post(self.url("/update")).json(report).send().await?;
        check(response).await.map(|_| ())
    }

    /// Winner of the last concluded round.
    pub async fn winner(&self) -> Result<WinnerResponse, ClientError> {
        let response = self.client.get(self.url("/winner")).send().await?;
        decode(response).await
    }

    /// Round snapshot.
    pub async fn status(&self) -> Result<RoundStatus, ClientError> {
        let response = self.client.get(self.url("/status")).send().await?;
        decode(response).await
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await?;
    let (code, message) = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => (Some(body.code), body.message),
        Err(_) => (None, text),
    };
    Err(ClientError::Rejected { status, code, message })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check(response).await?.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = CoordinatorClient::new("http://server:8080/");
        assert_eq!(client.base_url(), "http://server:8080");
        assert_eq!(client.url("/start"), "http://server:8080/start");
    }

    #[test]
    fn test_rejection_code() {
        let err = ClientError::Rejected {
            status: StatusCode::CONFLICT,
            code: Some(ErrorCode::RegistrationClosed),
            message: "closed".into(),
        };
        assert_eq!(err.code(), Some(ErrorCode::RegistrationClosed));
        assert!(err.to_string().contains("409"));
    }
}
