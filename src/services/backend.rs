// src/services/backend.rs

//! Client for the remote study-content backend.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::{
    error::AppError,
    models::{
        job::{DispatchResponse, GenerateEssayRequest, GenerateQuizRequest, JobStatusResponse},
        user::{AuthSession, LoginRequest, RegisterRequest, UserProfile},
    },
};

/// Operations the client core needs from the backend.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Installs (or clears) the bearer token sent with every request.
    fn set_token(&self, token: Option<String>);

    async fn login(&self, req: &LoginRequest) -> Result<AuthSession, AppError>;

    async fn register(&self, req: &RegisterRequest) -> Result<UserProfile, AppError>;

    async fn dispatch_quiz(&self, req: &GenerateQuizRequest) -> Result<DispatchResponse, AppError>;

    async fn dispatch_essay(
        &self,
        req: &GenerateEssayRequest,
    ) -> Result<DispatchResponse, AppError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, AppError>;
}

/// `reqwest` implementation of [`BackendApi`].
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl HttpBackend {
    /// `base_url` must end with '/' so relative paths append to it.
    pub fn new(base_url: Url) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("studyhub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url,
            token: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::InternalServerError(format!("Bad endpoint '{}': {}", path, e)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.token.read().ok().and_then(|t| t.clone());
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.authorize(self.client.post(url)).json(body).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut current) => *current = token,
            Err(e) => tracing::error!("Token lock poisoned: {}", e),
        }
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthSession, AppError> {
        self.post_json("auth/login", req).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<UserProfile, AppError> {
        self.post_json("auth/register", req).await
    }

    async fn dispatch_quiz(&self, req: &GenerateQuizRequest) -> Result<DispatchResponse, AppError> {
        self.post_json("generate/quiz", req).await
    }

    async fn dispatch_essay(
        &self,
        req: &GenerateEssayRequest,
    ) -> Result<DispatchResponse, AppError> {
        self.post_json("generate/essay", req).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, AppError> {
        let mut url = self.endpoint("jobs/")?;
        url.path_segments_mut()
            .map_err(|_| AppError::InternalServerError("Backend URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(job_id);

        let response = self.authorize(self.client.get(url)).send().await?;
        decode(response).await
    }
}

/// Maps non-success statuses onto `AppError`, then decodes the JSON body.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed backend response: {}", e)));
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Backend request failed")
            .to_string()
    });

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::AuthError(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::BadRequest(message),
        _ => AppError::Upstream(format!("{}: {}", status, message)),
    })
}

/// Backends report errors as `{"detail": ...}`, `{"error": ...}` or `{"message": ...}`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(str::to_string)
}
