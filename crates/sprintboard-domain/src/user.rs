use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type UserId = i64;

pub const USERNAME_MAX_LENGTH: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.")]
    InvalidUsername,

    #[error("Ensure this field has no more than 150 characters.")]
    UsernameTooLong,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Identity owned outside the board. The API only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    pub is_active: bool,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub token: String,
}

impl User {
    pub fn from_new(id: UserId, new_user: NewUser) -> Self {
        Self {
            id,
            username: new_user.username,
            full_name: new_user.full_name,
            is_active: new_user.is_active,
            password_hash: new_user.password_hash,
            token: new_user.token,
        }
    }

    pub fn check_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn set_password(&mut self, password: &str) -> Result<(), CredentialError> {
        self.password_hash = hash_password(password)?;
        Ok(())
    }

    pub fn rotate_token(&mut self) -> &str {
        self.token = generate_token();
        &self.token
    }
}

/// A user about to be stored, credentials already derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub is_active: bool,
    pub password_hash: String,
    pub token: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self, CredentialError> {
        let username = username.into();
        validate_username(&username)?;
        Ok(Self {
            username,
            full_name: String::new(),
            is_active: true,
            password_hash: hash_password(password)?,
            token: generate_token(),
        })
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }
}

/// Usernames appear as URL path segments, so they are limited to ASCII
/// letters, digits and `@.+-_`.
pub fn validate_username(username: &str) -> Result<(), CredentialError> {
    if username.is_empty()
        || !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(CredentialError::InvalidUsername);
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(CredentialError::UsernameTooLong);
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_check() {
        let user = User::from_new(1, NewUser::new("alice", "s3cret").unwrap());

        assert!(user.check_password("s3cret"));
        assert!(!user.check_password("S3cret"));
        assert!(!user.check_password(""));
    }

    #[test]
    fn test_hashes_are_salted_phc_strings() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("same"));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let mut user = User::from_new(1, NewUser::new("bob", "pw").unwrap());
        user.password_hash = "plain".to_string();
        assert!(!user.check_password("plain"));
    }

    #[test]
    fn test_rotate_token() {
        let mut user = User::from_new(1, NewUser::new("carol", "pw").unwrap());
        let before = user.token.clone();
        let after = user.rotate_token().to_string();

        assert_ne!(before, after);
        assert_eq!(after.len(), 32);
    }

    #[test]
    fn test_set_password() {
        let mut user = User::from_new(1, NewUser::new("dave", "old").unwrap());
        user.set_password("new").unwrap();
        assert!(user.check_password("new"));
        assert!(!user.check_password("old"));
    }

    #[test]
    fn test_username_character_set() {
        for ok in ["alice", "a.b", "me@host", "x+y", "snake_case", "kebab-case"] {
            assert_eq!(validate_username(ok), Ok(()), "{}", ok);
        }
        for bad in ["", "two words", "a/b", "q?x", "pct%20", "Zoë"] {
            assert_eq!(
                validate_username(bad),
                Err(CredentialError::InvalidUsername),
                "{}",
                bad
            );
        }
        assert_eq!(
            validate_username(&"a".repeat(151)),
            Err(CredentialError::UsernameTooLong)
        );
    }

    #[test]
    fn test_new_user_rejects_bad_username() {
        assert_eq!(
            NewUser::new("has space", "pw"),
            Err(CredentialError::InvalidUsername)
        );
    }
}
