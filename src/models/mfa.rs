// src/models/mfa.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Длина кода, которую принимает демо-проверка
pub const CODE_LENGTH: usize = 6;

/// Запись MFA для одного пользователя
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MfaRecord {
    pub identity: String,
    pub secret: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub enabled_at: Option<DateTime<Utc>>,
}

impl MfaRecord {
    /// Новая запись в состоянии `PendingSetup`
    pub fn pending(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
            enabled: false,
            created_at: Utc::now(),
            enabled_at: None,
        }
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            self.enabled = true;
            self.enabled_at = Some(Utc::now());
        }
    }
}

/// Состояние MFA пользователя
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfaState {
    NoRecord,
    PendingSetup,
    Enabled,
}

impl MfaState {
    pub fn of(record: Option<&MfaRecord>) -> Self {
        match record {
            None => MfaState::NoRecord,
            Some(r) if r.enabled => MfaState::Enabled,
            Some(_) => MfaState::PendingSetup,
        }
    }
}

/// Проверка одноразового кода.
///
/// NOTE: это заглушка вместо TOTP — принимается любая строка из шести
/// символов. Длина считается в единицах UTF-16, как у клиентов на JS.
pub fn is_acceptable_code(code: &str) -> bool {
    code.encode_utf16().count() == CODE_LENGTH
}
