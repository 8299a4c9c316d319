use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{Mutex, MutexGuard, PoisonError},
};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{
    error::ApiError,
    types::{Credential, Credentials},
    utils,
};

pub const MIN_PASSWORD_LEN: usize = 8;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

struct Account {
    username: String,
    password_hash: String,
}

struct Session {
    username: String,
    expires_at: u64,
}

/// Accounts and issued sessions, held for the lifetime of the process.
///
/// Passwords are kept as Argon2id PHC strings. Sessions are keyed by the
/// SHA-256 digest of the token, so the raw token only ever exists on the
/// client.
pub struct AccountStore {
    token_ttl: u64,
    accounts: Mutex<HashMap<String, Account>>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl AccountStore {
    pub fn new(token_ttl: u64) -> Self {
        Self {
            token_ttl,
            accounts: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Registers an account and issues its first session.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Username (trimmed, compared case-insensitively) and
    ///   password of at least [`MIN_PASSWORD_LEN`] characters
    ///
    /// # Returns
    ///
    /// - `Ok(Credential)` - The issued session
    /// - `Err(ApiError::Validation)` - Empty username or short password
    /// - `Err(ApiError::Conflict)` - Username already taken
    ///
    /// # Blocking
    ///
    /// Hashes the password with Argon2id. Call it from a blocking context.
    pub fn signup(&self, credentials: &Credentials) -> Result<Credential, ApiError> {
        let username = credentials.username.trim();
        if username.is_empty() {
            return Err(ApiError::Validation("Username is required".to_string()));
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let key = account_key(username);
        if self.accounts().contains_key(&key) {
            return Err(ApiError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let password_hash = hash_password(&credentials.password)?;

        match self.accounts().entry(key) {
            Entry::Occupied(_) => {
                return Err(ApiError::Conflict(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(Account {
                    username: username.to_string(),
                    password_hash,
                });
            }
        }

        Ok(self.issue(username.to_string()))
    }

    /// Checks a password and issues a new session. Unknown users and wrong
    /// passwords fail with the same `Unauthorized` message.
    pub fn login(&self, credentials: &Credentials) -> Result<Credential, ApiError> {
        let key = account_key(&credentials.username);
        let (username, password_hash) = match self.accounts().get(&key) {
            Some(account) => (account.username.clone(), account.password_hash.clone()),
            None => return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())),
        };

        if !verify_password(&credentials.password, &password_hash)? {
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(self.issue(username))
    }

    /// Resolves a bearer token to its username. Expired sessions are evicted.
    pub fn verify(&self, token: &str) -> Result<String, ApiError> {
        let digest = utils::hash_token(token);
        let mut sessions = self.sessions();

        let Some(session) = sessions.get(&digest) else {
            return Err(ApiError::Unauthorized("Invalid session token".to_string()));
        };

        if utils::now_secs() >= session.expires_at {
            sessions.remove(&digest);
            return Err(ApiError::Unauthorized("Session expired".to_string()));
        }

        Ok(session.username.clone())
    }

    pub fn revoke(&self, token: &str) -> Result<(), ApiError> {
        match self.sessions().remove(&utils::hash_token(token)) {
            Some(_) => Ok(()),
            None => Err(ApiError::Unauthorized("Invalid session token".to_string())),
        }
    }

    fn issue(&self, username: String) -> Credential {
        let token = utils::generate_token();
        let obtained_at = utils::now_secs();

        self.sessions().insert(
            utils::hash_token(&token),
            Session {
                username: username.clone(),
                expires_at: obtained_at.saturating_add(self.token_ttl),
            },
        );

        Credential {
            token,
            username,
            expires_in: self.token_ttl,
            obtained_at,
        }
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn account_key(username: &str) -> String {
    username.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| ApiError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
