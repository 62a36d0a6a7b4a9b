// src/lib.rs

//! Бэкенд для входа через кошелёк: проверка подписей `personal_sign`
//! и демонстрационный поток MFA.

pub mod auth;
pub mod config;
pub mod logging;
pub mod mfa_service;
pub mod models;
pub mod signature;
pub mod store;
pub mod verification;
pub mod web;
