use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

// ASCII word characters only; `\w` would also admit Unicode letters.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$")
        .expect("email pattern is valid")
});

static PASSWORD_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{8,}$").expect("password pattern is valid"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccountError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("password must be at least 8 characters with letters and numbers")]
    WeakPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMode {
    Login,
    Create,
}

/// Form input for the local account screen. Nothing leaves the device.
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub mode: AccountMode,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Signed-in account details shown on the account screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    username: String,
    email: String,
}

impl AccountDraft {
    /// Validate the form and produce the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns the first failing field as an `AccountError`.
    pub fn validate(self) -> Result<Account, AccountError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AccountError::EmptyUsername);
        }
        let email = self.email.trim();
        if !is_valid_email(email) {
            return Err(AccountError::InvalidEmail);
        }
        if !is_valid_password(&self.password) {
            return Err(AccountError::WeakPassword);
        }

        Ok(Account {
            username: username.to_string(),
            email: email.to_string(),
        })
    }
}

impl Account {
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// At least eight ASCII letters/digits, with one of each.
#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    PASSWORD_CHARSET.is_match(password)
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}
