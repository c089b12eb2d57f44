//! Registration and login on top of a [`UserBackend`].
//!
//! All calls are blocking (PBKDF2 plus file I/O); async callers should run
//! them on a blocking thread.

use std::sync::{Arc, Mutex};

use time::OffsetDateTime;

use crate::credentials::{hash_password, verify_password};
use crate::error::CoreError;
use crate::users::{UserBackend, UserRecord};

// Salt/key pair verified when a login identifier matches nobody, so that
// path costs one derivation like a wrong password does. The key is not
// valid hex and can never match.
const DECOY_SALT: &str = "00000000000000000000000000000000";
const DECOY_KEY: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("missing fields")]
    MissingFields,

    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Internal(#[from] CoreError),
}

/// What a successful login unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub download_link: String,
}

pub struct Accounts {
    backend: Arc<dyn UserBackend>,
    download_link: String,
    // Held across the duplicate checks and the write in `register`.
    register_lock: Mutex<()>,
}

impl Accounts {
    pub fn new(backend: Arc<dyn UserBackend>, download_link: impl Into<String>) -> Self {
        Self {
            backend,
            download_link: download_link.into(),
            register_lock: Mutex::new(()),
        }
    }

    pub fn download_link(&self) -> &str {
        &self.download_link
    }

    /// Create an account. Fields only need to be non-empty; whitespace is
    /// kept as given. Username uniqueness is checked before email
    /// uniqueness; neither check can race another registration.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AccountError::MissingFields);
        }

        // Derive outside the lock: it is the slow part and needs no store access.
        let hashed = hash_password(password, None);

        let _guard = self
            .register_lock
            .lock()
            .map_err(|_| CoreError::LockPoisoned)?;

        if self.backend.get(username)?.is_some() {
            return Err(AccountError::DuplicateUsername(username.to_string()));
        }
        if self.backend.find_by_email(email)?.is_some() {
            return Err(AccountError::DuplicateEmail(email.to_string()));
        }

        self.backend.put(UserRecord {
            username: username.to_string(),
            email: email.to_string(),
            salt: hashed.salt,
            password_key: hashed.key,
            registered: Some(OffsetDateTime::now_utc()),
        })?;

        tracing::info!(username, "account registered");
        Ok(())
    }

    /// Check a username-or-email plus password. The identifier is trimmed;
    /// the password is not. An unknown or empty identifier and a wrong or
    /// empty password all yield [`AccountError::InvalidCredentials`].
    pub fn authenticate(
        &self,
        login_identifier: &str,
        password: &str,
    ) -> Result<LoginGrant, AccountError> {
        let login_identifier = login_identifier.trim();

        let record = match self.backend.get(login_identifier)? {
            Some(record) => Some(record),
            None => self.backend.find_by_email(login_identifier)?,
        };

        let verified = match &record {
            Some(record) => verify_password(record, password),
            None => {
                std::hint::black_box(verify_password(&decoy_record(), password));
                false
            }
        };

        if !verified {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(LoginGrant {
            download_link: self.download_link.clone(),
        })
    }
}

fn decoy_record() -> UserRecord {
    UserRecord {
        username: String::new(),
        email: String::new(),
        salt: DECOY_SALT.to_string(),
        password_key: DECOY_KEY.to_string(),
        registered: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::MemoryBackend;

    const LINK: &str = "dist/DATA404.exe";

    fn accounts() -> Accounts {
        Accounts::new(Arc::new(MemoryBackend::new()), LINK)
    }

    #[test]
    fn register_then_login_by_username() {
        let accounts = accounts();
        accounts
            .register("alice", "a@x.com", "pw")
            .expect("register should succeed");

        let grant = accounts
            .authenticate("alice", "pw")
            .expect("login should succeed");
        assert_eq!(grant.download_link, LINK);
    }

    #[test]
    fn login_by_email() {
        let accounts = accounts();
        accounts.register("alice", "a@x.com", "pw").expect("register");

        let grant = accounts
            .authenticate("a@x.com", "pw")
            .expect("email login should succeed");
        assert_eq!(grant.download_link, LINK);

        assert!(matches!(
            accounts.authenticate("a@x.com", "wrong"),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn email_lookup_ignores_ascii_case() {
        let accounts = accounts();
        accounts.register("alice", "A@X.com", "pw").expect("register");

        assert!(accounts.authenticate("a@x.COM", "pw").is_ok());
    }

    #[test]
    fn username_lookup_wins_over_email() {
        let accounts = accounts();
        accounts.register("bob", "b@x.com", "bob-pw").expect("register bob");
        // A username that happens to equal another account's email.
        accounts
            .register("b@x.com", "other@x.com", "squatter-pw")
            .expect("register squatter");

        assert!(accounts.authenticate("b@x.com", "squatter-pw").is_ok());
        assert!(matches!(
            accounts.authenticate("b@x.com", "bob-pw"),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn unknown_identifier_looks_like_wrong_password() {
        let accounts = accounts();
        accounts.register("alice", "a@x.com", "pw").expect("register");

        let unknown = accounts.authenticate("nobody", "anything");
        let wrong = accounts.authenticate("alice", "anything");
        assert!(matches!(unknown, Err(AccountError::InvalidCredentials)));
        assert!(matches!(wrong, Err(AccountError::InvalidCredentials)));
        assert_eq!(
            unknown.unwrap_err().to_string(),
            wrong.unwrap_err().to_string()
        );
    }

    #[test]
    fn duplicate_username_is_rejected_without_overwrite() {
        let accounts = accounts();
        accounts.register("alice", "a@x.com", "first").expect("register");

        assert!(matches!(
            accounts.register("alice", "new@x.com", "second"),
            Err(AccountError::DuplicateUsername(name)) if name == "alice"
        ));
        assert!(accounts.authenticate("alice", "first").is_ok());
        assert!(accounts.authenticate("alice", "second").is_err());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let accounts = accounts();
        accounts.register("alice", "a@x.com", "pw").expect("register");

        assert!(matches!(
            accounts.register("alice2", "A@x.com", "pw"),
            Err(AccountError::DuplicateEmail(_))
        ));
    }

    #[test]
    fn username_check_precedes_email_check() {
        let accounts = accounts();
        accounts.register("alice", "a@x.com", "pw").expect("register");

        assert!(matches!(
            accounts.register("alice", "a@x.com", "pw"),
            Err(AccountError::DuplicateUsername(_))
        ));
    }

    #[test]
    fn empty_registration_fields_are_missing() {
        let accounts = accounts();
        assert!(matches!(
            accounts.register("", "a@x.com", "pw"),
            Err(AccountError::MissingFields)
        ));
        assert!(matches!(
            accounts.register("alice", "", "pw"),
            Err(AccountError::MissingFields)
        ));
        assert!(matches!(
            accounts.register("alice", "a@x.com", ""),
            Err(AccountError::MissingFields)
        ));
    }

    #[test]
    fn empty_login_fields_are_invalid_credentials() {
        let accounts = accounts();
        accounts.register("alice", "a@x.com", "pw").expect("register");

        assert!(matches!(
            accounts.authenticate("", "pw"),
            Err(AccountError::InvalidCredentials)
        ));
        assert!(matches!(
            accounts.authenticate("alice", ""),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn whitespace_password_is_a_real_password() {
        let accounts = accounts();
        accounts
            .register("bob", "b@x.com", "   ")
            .expect("non-empty whitespace password should register");

        assert!(accounts.authenticate("bob", "   ").is_ok());
        assert!(matches!(
            accounts.authenticate("bob", " "),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn login_identifier_is_trimmed() {
        let accounts = accounts();
        accounts.register("alice", "a@x.com", "pw").expect("register");

        assert!(accounts.authenticate(" alice ", "pw").is_ok());
        assert!(accounts.authenticate("\ta@x.com\n", "pw").is_ok());
    }

    #[test]
    fn registration_records_creation_time() {
        let backend = Arc::new(MemoryBackend::new());
        let accounts = Accounts::new(backend.clone(), LINK);
        let before = OffsetDateTime::now_utc();
        accounts.register("alice", "a@x.com", "pw").expect("register");

        let record = backend
            .get("alice")
            .expect("get")
            .expect("alice stored");
        let registered = record.registered.expect("timestamp set on register");
        assert!(registered >= before);
        assert!(registered <= OffsetDateTime::now_utc());
    }

    #[test]
    fn decoy_never_verifies() {
        assert!(!verify_password(&decoy_record(), ""));
        assert!(!verify_password(&decoy_record(), "-"));
    }
}
