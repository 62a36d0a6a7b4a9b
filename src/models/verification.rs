// src/models/verification.rs

use serde::Serialize;

/// Результат проверки подписи.
///
/// Поля закрыты: `signer` и `error` никогда не заполняются одновременно.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    signer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl VerificationResult {
    pub fn valid(signer: String, original_message: String) -> Self {
        Self {
            is_valid: true,
            signer: Some(signer),
            original_message: Some(original_message),
            error: None,
        }
    }

    pub fn invalid(error: String) -> Self {
        Self {
            is_valid: false,
            signer: None,
            original_message: None,
            error: Some(error),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn signer(&self) -> Option<&str> {
        self.signer.as_deref()
    }

    pub fn original_message(&self) -> Option<&str> {
        self.original_message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
