use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field-keyed validation errors as the identity service returns them,
/// e.g. `{"email": ["..."], "non_field_errors": ["..."]}`.
///
/// Surfaced verbatim so forms can attach each message to its field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Key the service uses for errors not tied to a single field.
    pub const NON_FIELD: &'static str = "non_field_errors";

    /// A single message under one field key.
    pub fn single(field: &str, message: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.to_string()]);
        Self(fields)
    }

    /// Messages attached to a field, if any.
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(|messages| messages.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("unauthorized - credentials rejected or token expired")]
    Unauthorized,

    #[error("server error: {0}")]
    ServerError(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 => Self::from_rejection(body),
            401 => ApiError::Unauthorized,
            500..=599 => ApiError::ServerError(Self::truncate_body(body)),
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    /// Parse a 400 body. Serializer errors arrive as field-keyed message
    /// lists; the login view also rejects disabled accounts with a bare
    /// `{"error": "..."}`, folded here under the non-field key so callers
    /// branch on one tag for every rejection shape.
    fn from_rejection(body: &str) -> Self {
        if let Ok(fields) = serde_json::from_str::<BTreeMap<String, Vec<String>>>(body) {
            return ApiError::Validation(FieldErrors(fields));
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }

        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            return ApiError::Validation(FieldErrors::single(FieldErrors::NON_FIELD, &parsed.error));
        }

        ApiError::InvalidResponse(format!("Status 400: {}", Self::truncate_body(body)))
    }
}
