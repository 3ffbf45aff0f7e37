// Administrator login and registration for the management console. Demo
// grade on purpose: plain-text credentials, opaque session tokens, and the
// original flow's simulated request latency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tracing::{info, warn};

pub const DEMO_USERNAME: &str = "admin";
pub const DEMO_PASSWORD: &str = "123456";

const LOGIN_LATENCY: Duration = Duration::from_millis(800);
const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username must be at least {MIN_USERNAME_LEN} characters")]
    UsernameTooShort,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

struct Account {
    password: String,
    email: Option<String>,
}

// Account and token tables for the console. Ships with the demo account so
// the login screen works out of the box.
pub struct AdminDirectory {
    accounts: DashMap<String, Account>,
    // token -> username
    tokens: DashMap<String, String>,
    token_seq: AtomicU64,
    latency: Duration,
}

impl AdminDirectory {
    pub fn new() -> Self {
        let accounts = DashMap::new();
        accounts.insert(
            DEMO_USERNAME.to_string(),
            Account {
                password: DEMO_PASSWORD.to_string(),
                email: None,
            },
        );
        Self {
            accounts,
            tokens: DashMap::new(),
            token_seq: AtomicU64::new(0),
            latency: LOGIN_LATENCY,
        }
    }

    pub fn set_latency(&mut self, latency: Duration) {
        self.latency = latency;
    }

    // Form rules first, then the credential check behind the simulated
    // request delay. A success issues a fresh opaque token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        if self.latency > Duration::ZERO {
            tokio::time::sleep(self.latency).await;
        }

        let matches = self
            .accounts
            .get(username)
            .map(|account| account.password == password)
            .unwrap_or(false);
        if !matches {
            warn!(username, "rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let seq = self.token_seq.fetch_add(1, Ordering::Relaxed);
        let token = format!("mock-token-{}", seq);
        self.tokens.insert(token.clone(), username.to_string());
        info!(username, "administrator logged in");

        Ok(Session {
            token,
            username: username.to_string(),
        })
    }

    // Registration does not log the new account in; the console switches
    // back to the login tab afterwards.
    pub fn register(&self, email: &str, username: &str, password: &str) -> Result<(), AuthError> {
        if !looks_like_email(email) {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }
        validate_username(username)?;
        validate_password(password)?;

        if self.accounts.contains_key(username) {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }
        self.accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                email: Some(email.to_string()),
            },
        );
        info!(username, "administrator account registered");
        Ok(())
    }

    pub fn authenticate(&self, token: &str) -> Option<String> {
        self.tokens.get(token).map(|entry| entry.value().clone())
    }

    pub fn logout(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }
}

impl Default for AdminDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AuthError::UsernameTooShort);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
