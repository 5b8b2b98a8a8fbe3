//! Decorative login state.
//!
//! Any non-empty username/password pair is accepted. Nothing is verified and
//! no token is issued; the session is an in-memory flag plus the name shown
//! back to the user.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Please enter username and password")]
    MissingCredentials,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the pair if both parts are non-empty.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), LoginError> {
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }
        self.username = Some(username.to_owned());
        Ok(())
    }

    pub fn logout(&mut self) {
        self.username = None;
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}
