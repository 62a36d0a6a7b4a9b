// src/web/mfa.rs

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use super::AppState;
use crate::mfa_service::{MfaError, MfaSetup, MfaStatus};

#[derive(Deserialize, Default)]
pub struct MfaRequest {
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub code: Value,
}

impl MfaRequest {
    fn identity(&self) -> Result<&str, MfaError> {
        self.email
            .as_str()
            .filter(|email| !email.is_empty())
            .ok_or(MfaError::MissingIdentity)
    }

    // не-строка не пройдёт проверку длины, но порядок ошибок решает сервис
    fn code(&self) -> &str {
        self.code.as_str().unwrap_or_default()
    }
}

/// Тело MFA-запроса. Битый JSON или чужой Content-Type читаются как `{}`,
/// а ошибки чтения тела (например, превышение лимита) уходят клиенту как есть.
pub struct MfaPayload(pub MfaRequest);

#[async_trait]
impl<S> FromRequest<S> for MfaPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<MfaRequest>::from_request(req, state).await {
            Ok(Json(request)) => Ok(Self(request)),
            Err(JsonRejection::BytesRejection(rejection)) => Err(rejection.into_response()),
            Err(_) => Ok(Self(MfaRequest::default())),
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl MessageResponse {
    fn json(message: &'static str) -> Json<Self> {
        Json(Self {
            message,
            token: None,
        })
    }
}

pub async fn status(
    State(mfa): State<AppState>,
    MfaPayload(request): MfaPayload,
) -> Result<Json<MfaStatus>, MfaError> {
    match request.identity() {
        Ok(identity) => Ok(Json(mfa.status(identity).await?)),
        Err(_) => Ok(Json(MfaStatus::default())),
    }
}

pub async fn setup(
    State(mfa): State<AppState>,
    MfaPayload(request): MfaPayload,
) -> Result<Json<MfaSetup>, MfaError> {
    let setup = mfa.setup(request.identity()?).await?;
    Ok(Json(setup))
}

pub async fn verify_setup(
    State(mfa): State<AppState>,
    MfaPayload(request): MfaPayload,
) -> Result<Json<MessageResponse>, MfaError> {
    mfa.confirm_setup(request.identity()?, request.code()).await?;
    Ok(MessageResponse::json("MFA setup completed successfully"))
}

pub async fn verify(
    State(mfa): State<AppState>,
    MfaPayload(request): MfaPayload,
) -> Result<Json<MessageResponse>, MfaError> {
    let token = mfa.verify(request.identity()?, request.code()).await?;
    Ok(Json(MessageResponse {
        message: "MFA verification successful",
        token: Some(token),
    }))
}

pub async fn disable(
    State(mfa): State<AppState>,
    MfaPayload(request): MfaPayload,
) -> Result<Json<MessageResponse>, MfaError> {
    mfa.disable(request.identity()?, request.code()).await?;
    Ok(MessageResponse::json("MFA disabled successfully"))
}

impl IntoResponse for MfaError {
    fn into_response(self) -> Response {
        let status = match &self {
            MfaError::MissingIdentity | MfaError::InvalidCode => StatusCode::BAD_REQUEST,
            MfaError::SetupNotFound | MfaError::NotEnabled => StatusCode::NOT_FOUND,
            MfaError::Store(_) | MfaError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "MFA request failed");
            return (status, Json(json!({ "error": "Internal error" }))).into_response();
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
