// src/verification.rs

use serde_json::Value;
use tracing::debug;

use crate::models::VerificationResult;
use crate::signature::{recover_personal_signer, SignatureError};

/// Проверить подпись сообщения.
///
/// Никогда не возвращает ошибку: любой сбой превращается в
/// `VerificationResult` с `isValid: false`.
pub fn verify_message(message: &Value, signature: &Value) -> VerificationResult {
    match recover(message, signature) {
        Ok((signer, message)) => {
            debug!(signer = %signer, "signature recovered");
            VerificationResult::valid(signer, message)
        }
        Err(e) => {
            debug!(error = %e, "signature verification failed");
            VerificationResult::invalid(e.to_string())
        }
    }
}

fn recover(message: &Value, signature: &Value) -> Result<(String, String), SignatureError> {
    let message = message
        .as_str()
        .ok_or(SignatureError::NotAString("message"))?;
    let signature = signature
        .as_str()
        .ok_or(SignatureError::NotAString("signature"))?;

    let signer = recover_personal_signer(message, signature)?;
    Ok((signer.to_checksum(), message.to_owned()))
}
