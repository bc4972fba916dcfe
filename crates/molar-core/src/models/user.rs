//! Account and credential payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user profile as returned by the accounts endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub preferred_district: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default = "default_true")]
    pub notification_enabled: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Access/refresh token pair issued on login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Registration request body. A superset of the profile fields.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Partial profile update. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_district: Option<String>,
}

/// Password change request body.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_with_partial_fields() {
        let json = r#"{"id": 1, "username": "minji", "email": "minji@example.com"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user");
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "minji@example.com");
        assert!(user.phone.is_empty());
        assert!(!user.is_premium);
        assert!(user.notification_enabled);
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let update = ProfileUpdate {
            phone: Some("010-1234-5678".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).expect("Failed to serialize update");
        assert_eq!(json, serde_json::json!({"phone": "010-1234-5678"}));
    }
}
