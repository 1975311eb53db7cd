//! Identity service API module.
//!
//! This module provides the `IdentityClient` for the five credential
//! lifecycle endpoints (login, signup, refresh, logout, profile) and
//! the `IdentityApi` trait the session manager is written against.
//!
//! The service authenticates requests with JWT bearer access tokens;
//! refresh tokens are sent only to the refresh and logout endpoints.

pub mod client;
pub mod error;

pub use client::{AuthPayload, IdentityApi, IdentityClient};
pub use error::{ApiError, FieldErrors};
