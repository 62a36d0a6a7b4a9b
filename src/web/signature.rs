// src/web/signature.rs

use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::models::VerificationResult;
use crate::verification::verify_message;

/// Поля не типизированы: число или `null` вместо строки — это
/// неуспешная проверка, а не ошибка десериализации.
#[derive(Deserialize, Default)]
pub struct VerifyRequest {
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub signature: Value,
}

/// Всегда 200; успех определяется только полем `isValid`
pub async fn verify_signature(payload: Option<Json<VerifyRequest>>) -> Json<VerificationResult> {
    let Json(request) = payload.unwrap_or_default();
    Json(verify_message(&request.message, &request.signature))
}
