//! Molar core - client library for the molar dental clinic discovery
//! service.
//!
//! This crate is the headless core a UI builds on: it owns the
//! authentication session (login, registration, restore, logout), the
//! authenticated request gateway with its single refresh-retry protocol,
//! and typed wrappers for the clinic, review, and price endpoints.
//!
//! The backend uses JWT bearer authentication: a short-lived access token
//! authorizes calls and a refresh token mints replacements. Both are held
//! in durable storage behind the `TokenStore` trait (OS keychain, JSON
//! file, or in-memory).

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiError, ClinicApi, Gateway, PriceApi, ReviewApi};
pub use auth::{
    AuthError, FileTokenStore, KeyringTokenStore, MemoryTokenStore, SessionStatus, SessionStore,
    TokenStore,
};
pub use config::Config;
