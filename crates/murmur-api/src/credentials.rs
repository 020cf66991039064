use std::sync::{Arc, OnceLock};

use tracing::{debug, error, info, warn};

use murmur_crypto::{hash_password, verify_password};
use murmur_db::models::UserRow;
use murmur_db::{Database, DbError};
use murmur_types::models::User;

use crate::error::CoreError;

pub const MAX_USERNAME_LEN: usize = 80;
pub const MAX_EMAIL_LEN: usize = 120;

/// Owns user records: registration and login verification.
pub struct CredentialStore {
    db: Arc<Database>,
}

/// A login identifier after normalization.
///
/// Usernames cannot contain `@`, so anything with one is an email and is
/// matched case-insensitively; usernames match exactly.
#[derive(Debug, PartialEq, Eq)]
enum Identifier {
    Username(String),
    Email(String),
}

impl Identifier {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.contains('@') {
            Self::Email(raw.to_lowercase())
        } else {
            Self::Username(raw.to_string())
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::Email(_) => "email",
        }
    }
}

impl CredentialStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<User, CoreError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        if username.is_empty() || email.is_empty() || password.trim().is_empty() {
            return Err(CoreError::Validation("username, email and password are required"));
        }
        if username.contains('@') {
            return Err(CoreError::Validation("username must not contain '@'"));
        }
        // Login routes identifiers with an '@' to the email column.
        if !email.contains('@') {
            return Err(CoreError::Validation("email must contain '@'"));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(CoreError::Validation("username is too long"));
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(CoreError::Validation("email is too long"));
        }

        if self.db.user_exists(username, &email)? {
            return Err(CoreError::Conflict);
        }

        let password_hash = hash_password(password).map_err(|e| {
            error!("Failed to hash password: {}", e);
            CoreError::Internal
        })?;

        let id = self.create_user(username, &email, &password_hash)?;

        info!(user_id = id, "Registered user {}", username);
        Ok(User {
            id,
            username: username.to_string(),
            email,
        })
    }

    /// The pre-check in `register` can race with a concurrent registration;
    /// the UNIQUE indexes are the authoritative guard.
    fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<i64, CoreError> {
        match self.db.create_user(username, email, password_hash) {
            Ok(id) => Ok(id),
            Err(DbError::UniqueViolation) => {
                debug!("Registration lost a uniqueness race");
                Err(CoreError::Conflict)
            }
            Err(e) => Err(CoreError::StoreUnavailable(e)),
        }
    }

    pub fn authenticate(&self, identifier: &str, password: &str) -> Result<User, CoreError> {
        let identifier = Identifier::parse(identifier);
        let row = match &identifier {
            Identifier::Username(name) => self.db.get_user_by_username(name)?,
            Identifier::Email(email) => self.db.get_user_by_email(email)?,
        };

        let Some(row) = row else {
            // Spend the same hashing work as a real check so timing does not
            // reveal which identifiers exist.
            if let Some(hash) = dummy_hash() {
                let _ = verify_password(password, hash);
            }
            debug!(kind = identifier.kind(), "Login failed");
            return Err(CoreError::Auth);
        };

        match verify_password(password, &row.password_hash) {
            Ok(true) => {
                debug!(user_id = row.id, kind = identifier.kind(), "Login succeeded");
                Ok(to_user(row))
            }
            Ok(false) => {
                debug!(kind = identifier.kind(), "Login failed");
                Err(CoreError::Auth)
            }
            Err(e) => {
                warn!(user_id = row.id, "Stored password hash unusable: {}", e);
                Err(CoreError::Auth)
            }
        }
    }

    /// Load a user by id, e.g. to resolve a session back to its account.
    pub fn user(&self, id: i64) -> Result<Option<User>, CoreError> {
        Ok(self.db.get_user_by_id(id)?.map(to_user))
    }
}

fn to_user(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
        email: row.email,
    }
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("murmur-timing-equalizer").ok())
        .as_deref()
}
