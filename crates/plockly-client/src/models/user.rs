use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity snapshot returned by the identity service.
///
/// Mirrors the service's user serializer field for field. The client
/// never constructs one locally and never updates fields piecemeal:
/// the snapshot is replaced wholesale on login, signup, or restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_payload() {
        let json = r#"{
            "id": 7,
            "username": "a@b.com",
            "email": "a@b.com",
            "is_active": true,
            "date_joined": "2025-11-02T09:14:33.120843Z"
        }"#;

        let user: User = serde_json::from_str(json).expect("user payload should parse");
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "a@b.com");
        assert_eq!(user.email, "a@b.com");
        assert!(user.is_active);
    }

    #[test]
    fn roundtrips_through_json() {
        let user = User {
            id: 42,
            username: "test@example.com".to_string(),
            email: "test@example.com".to_string(),
            is_active: true,
            date_joined: Utc::now(),
        };

        let json = serde_json::to_string(&user).expect("user should serialize");
        let parsed: User = serde_json::from_str(&json).expect("user should parse back");
        assert_eq!(parsed, user);
    }
}
