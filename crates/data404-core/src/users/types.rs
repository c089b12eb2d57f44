use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One registered account. `username` is the store key and is compared
/// case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    /// Hex-encoded random salt.
    pub salt: String,
    /// Hex-encoded PBKDF2 output.
    pub password_key: String,
    /// When the account was created. Absent for records written without one.
    pub registered: Option<OffsetDateTime>,
}

impl UserRecord {
    /// ASCII case-insensitive email match.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

// ==============================================================================
// On-disk Shape
// ==============================================================================

/// The value half of a `username -> record` entry in the store document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StoredUser {
    pub email: String,
    pub salt: String,
    pub password_key: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub registered: Option<OffsetDateTime>,
}

impl StoredUser {
    pub fn into_record(self, username: String) -> UserRecord {
        UserRecord {
            username,
            email: self.email,
            salt: self.salt,
            password_key: self.password_key,
            registered: self.registered,
        }
    }
}

impl From<UserRecord> for StoredUser {
    fn from(record: UserRecord) -> Self {
        Self {
            email: record.email,
            salt: record.salt,
            password_key: record.password_key,
            registered: record.registered,
        }
    }
}
