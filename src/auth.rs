// src/auth.rs

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token secret must not be empty")]
    EmptySecret,
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

// === Claims ===

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // identity (email)
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
    /// Сессия прошла второй фактор
    pub mfa: bool,
}

/// Выпуск и проверка токенов сессии после MFA (HS256)
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, issuer: &str, ttl_secs: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_owned(),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        })
    }

    pub fn issue(&self, identity: &str) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: identity.to_owned(),
            iss: self.issuer.clone(),
            exp: now.saturating_add(self.ttl_secs) as usize,
            iat: now as usize,
            jti: Uuid::new_v4().to_string(),
            mfa: true,
        };

        let header = Header::new(Algorithm::HS256);
        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[self.issuer.as_str()]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
