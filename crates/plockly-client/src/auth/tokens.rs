use serde::{Deserialize, Serialize};

/// Access/refresh token pair issued by the identity service.
///
/// The pair is stored and discarded as a unit; an access token is never
/// persisted without the refresh token that can replace it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Storage lifetime class chosen for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageHorizon {
    /// Survives process restarts ("remember me").
    Persistent,
    /// Lives only as long as this process.
    Ephemeral,
}
