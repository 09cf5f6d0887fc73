//! User account record.
//!
//! # Invariants
//! - `email` is unique across the collection (compared case-insensitively).
//! - `password_hash` holds a PHC string, never plaintext, once the data
//!   layer has opened the store.
//! - `approved` only gates instructors; other roles are created approved.

use super::{require_text, Record, RecordId, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    /// Legacy layouts stored the plaintext under `password`; those are
    /// rehashed when the data layer opens.
    #[serde(alias = "password")]
    pub password_hash: String,
    pub role: Role,
    pub approved: bool,
    #[serde(default)]
    pub avatar: Option<String>,
    pub joined_date: i64,
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> RecordId {
        self.id
    }
}

impl User {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        validate_email(&self.email)
    }

    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }

    pub fn has_email(&self, email: &str) -> bool {
        normalize_email(&self.email) == normalize_email(email)
    }
}

/// Registration input; the password is hashed before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub avatar: Option<String>,
}

/// Profile update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_email, Role, User};

    fn user(email: &str) -> User {
        User {
            id: 1,
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            role: Role::Student,
            approved: true,
            avatar: None,
            joined_date: 0,
        }
    }

    #[test]
    fn email_comparison_ignores_case_and_padding() {
        assert!(user("Ada@Example.com").has_email(" ada@example.COM "));
        assert!(!user("ada@example.com").has_email("bob@example.com"));
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("a@b.io").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("two@@signs.com").is_err());
    }

    #[test]
    fn legacy_password_field_is_accepted() {
        let json = r#"{"id":1,"name":"Ada","email":"a@b.io","password":"secret",
            "role":"instructor","approved":false,"joinedDate":0}"#;
        let parsed: User = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.password_hash, "secret");
        assert_eq!(parsed.role, Role::Instructor);
        assert_eq!(parsed.avatar, None);
    }
}
