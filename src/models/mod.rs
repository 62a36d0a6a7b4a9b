// src/models/mod.rs

pub mod mfa;
pub mod verification;

// Re-exports

pub use mfa::{is_acceptable_code, MfaRecord, MfaState, CODE_LENGTH};
pub use verification::VerificationResult;
