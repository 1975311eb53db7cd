//! Core client library for Plockly.
//!
//! This crate owns the authentication session lifecycle for Plockly
//! clients: login, signup, logout, startup restoration, and silent
//! access-token renewal, backed by a two-horizon credential store
//! ("remember me" vs. this-process-only).
//!
//! Record CRUD and all UI concerns live in the consuming application;
//! this crate only speaks to the identity endpoints. The library never
//! installs a tracing subscriber - that is the host application's job.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiError, AuthPayload, FieldErrors, IdentityApi, IdentityClient};
pub use auth::{
    AuthError, CredentialStore, SessionManager, SessionState, StorageHorizon, TokenPair,
};
pub use config::Config;
pub use models::User;
