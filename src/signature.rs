// src/signature.rs

//! Подписи Ethereum `personal_sign` (EIP-191): хеширование сообщения,
//! разбор подписи, восстановление адреса и локальный кошелёк для подписи.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::RngCore;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Ошибки разбора и восстановления подписи
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid {0}: expected a string")]
    NotAString(&'static str),
    #[error("invalid signature: expected a 0x-prefixed hex string")]
    MissingPrefix,
    #[error("invalid signature hex: {0}")]
    InvalidHex(String),
    #[error("invalid raw signature length: {0} bytes")]
    InvalidLength(usize),
    #[error("invalid signature v: {0}")]
    InvalidRecoveryByte(u8),
    #[error("non-canonical signature s")]
    NonCanonicalS,
    #[error("signature recovery failed: {0}")]
    Recovery(String),
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// Хеш сообщения с префиксом `\x19Ethereum Signed Message:\n<длина в байтах>`
pub fn hash_message(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());

    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// 20-байтовый адрес аккаунта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        // первый байт 0x04 — тег несжатой точки
        let hash = keccak256(&point.as_bytes()[1..]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Адрес в смешанном регистре (EIP-55)
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = SignatureError;

    /// Регистр не проверяется: принимается любой 0x + 40 hex-символов
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .ok_or_else(|| SignatureError::InvalidAddress(s.to_string()))?;
        let bytes = hex::decode(hex_part)
            .map_err(|e| SignatureError::InvalidAddress(e.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

/// Подпись `r ‖ s` с битом чётности для восстановления ключа
#[derive(Debug, Clone, Copy)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// Разобрать подпись из строки `0x…`.
    ///
    /// 65 байт — `r ‖ s ‖ v`, 64 байта — компактная форма EIP-2098.
    pub fn parse(input: &str) -> Result<Self, SignatureError> {
        let hex_part = input
            .strip_prefix("0x")
            .ok_or(SignatureError::MissingPrefix)?;
        let bytes = hex::decode(hex_part).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;

        match bytes.len() {
            65 => {
                if bytes[32] & 0x80 != 0 {
                    return Err(SignatureError::NonCanonicalS);
                }
                let y_odd = normalize_v(bytes[64])?;
                Self::from_parts(&bytes[..64], y_odd)
            }
            64 => {
                let mut rs = [0u8; 64];
                rs.copy_from_slice(&bytes);
                let y_odd = rs[32] & 0x80 != 0;
                rs[32] &= 0x7f;
                Self::from_parts(&rs, y_odd)
            }
            n => Err(SignatureError::InvalidLength(n)),
        }
    }

    fn from_parts(rs: &[u8], y_odd: bool) -> Result<Self, SignatureError> {
        let signature =
            Signature::from_slice(rs).map_err(|e| SignatureError::Recovery(e.to_string()))?;
        Ok(Self {
            signature,
            recovery_id: RecoveryId::new(y_odd, false),
        })
    }

    /// Восстановить адрес по 32-байтовому хешу
    pub fn recover(&self, prehash: &[u8; 32]) -> Result<Address, SignatureError> {
        let key = VerifyingKey::recover_from_prehash(prehash, &self.signature, self.recovery_id)
            .map_err(|e| SignatureError::Recovery(e.to_string()))?;
        Ok(Address::from_verifying_key(&key))
    }

    /// `r ‖ s ‖ v`, где v ∈ {27, 28}
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.signature.to_bytes());
        out[64] = 27 + u8::from(self.recovery_id.is_y_odd());
        out
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// 0/27 и 1/28 — legacy, v >= 35 — EIP-155 (chain id закодирован в v)
fn normalize_v(v: u8) -> Result<bool, SignatureError> {
    match v {
        0 | 27 => Ok(false),
        1 | 28 => Ok(true),
        v if v >= 35 => Ok((v - 35) % 2 == 1),
        other => Err(SignatureError::InvalidRecoveryByte(other)),
    }
}

/// Восстановить адрес, подписавший `message`.
///
/// Подпись чужого сообщения тоже даёт валидный адрес — просто другой.
/// Сравнивать его с ожидаемым должен вызывающий.
pub fn recover_personal_signer(message: &str, signature: &str) -> Result<Address, SignatureError> {
    let signature = RecoverableSignature::parse(signature)?;
    signature.recover(&hash_message(message))
}

/// Кошелёк с приватным ключом в памяти (для CLI и тестов)
pub struct LocalWallet {
    key: SigningKey,
    address: Address,
}

impl LocalWallet {
    pub fn from_signing_key(key: SigningKey) -> Self {
        let address = Address::from_verifying_key(key.verifying_key());
        Self { key, address }
    }

    /// Ключ в hex, с префиксом `0x` или без
    pub fn from_hex(key: &str) -> Result<Self, SignatureError> {
        let hex_part = key.strip_prefix("0x").unwrap_or(key);
        let bytes = hex::decode(hex_part).map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
        let key =
            SigningKey::from_slice(&bytes).map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
        Ok(Self::from_signing_key(key))
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            // вероятность попасть вне порядка кривой ничтожна, но возможна
            if let Ok(key) = SigningKey::from_slice(&bytes) {
                return Self::from_signing_key(key);
            }
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sign_message(&self, message: &str) -> Result<RecoverableSignature, SignatureError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash_message(message))
            .map_err(|e| SignatureError::Recovery(e.to_string()))?;
        Ok(RecoverableSignature {
            signature,
            recovery_id,
        })
    }
}
