//! User accounts and the signup/signin commands.

use serde::{Deserialize, Serialize};

use soil_core::{require_text, Document, DomainError, DomainResult, UserId};

use crate::Role;

/// A stored account. `password_hash` never leaves the server; respond with
/// [`UserSummary`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub full_name: String,
    /// Trimmed and lower-cased; see [`normalize_email`].
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub version: u64,
}

/// Client-safe view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&UserAccount> for UserSummary {
    fn from(u: &UserAccount) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name.clone(),
            email: u.email.clone(),
            role: u.role.clone(),
        }
    }
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Command: create an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUp {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A signup whose fields are all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignUp {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

const SIGNUP_REQUIRED: &str = "Full name, email, and password are required.";
const SIGNIN_REQUIRED: &str = "Email and password are required.";

impl SignUp {
    pub fn validate(self) -> DomainResult<ValidSignUp> {
        let full_name = require_text(self.full_name.as_deref(), SIGNUP_REQUIRED)?;
        let email = require_text(self.email.as_deref(), SIGNUP_REQUIRED)?;
        // Passwords are taken verbatim; only emptiness is checked.
        let password = match self.password {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(DomainError::validation(SIGNUP_REQUIRED)),
        };
        Ok(ValidSignUp {
            full_name,
            email: normalize_email(&email),
            password,
        })
    }
}

/// Command: exchange credentials for a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignIn {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl SignIn {
    /// Returns the normalised email and the raw password.
    pub fn validate(self) -> DomainResult<(String, String)> {
        let email = require_text(self.email.as_deref(), SIGNIN_REQUIRED)?;
        match self.password {
            Some(p) if !p.trim().is_empty() => Ok((normalize_email(&email), p)),
            _ => Err(DomainError::validation(SIGNIN_REQUIRED)),
        }
    }
}

impl UserAccount {
    pub fn register(id: UserId, signup: &ValidSignUp, password_hash: String) -> Self {
        Self {
            id,
            full_name: signup.full_name.clone(),
            email: signup.email.clone(),
            password_hash,
            role: Role::user(),
            version: 0,
        }
    }
}

impl Document for UserAccount {
    type Id = UserId;

    const COLLECTION: &'static str = "users";
    const NOUN: &'static str = "User";

    fn id(&self) -> UserId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
