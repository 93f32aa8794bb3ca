//! Session token lifecycle.
//!
//! A [`Session`] owns the credentials of one client and the token obtained for
//! them. [`Session::with_token`] hands a valid token to an operation, logging
//! in lazily and logging in again exactly once when the server rejects the
//! cached token.

use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::fault::RemoteFault;

/// Username and password used to log in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Something that can exchange credentials for a session token.
pub trait Authenticator {
    /// Log in and return a session token.
    ///
    /// # Errors
    /// Returns a fault if the server rejects the credentials or the call fails.
    fn login(&self, username: &str, password: &str) -> std::result::Result<String, RemoteFault>;
}

/// Token cache for one set of credentials.
///
/// The token is held behind a mutex that is never held across a remote call;
/// concurrent callers racing on an invalid token may each log in once.
#[derive(Debug, Default)]
pub struct Session {
    credentials: Option<Credentials>,
    token: Mutex<Option<String>>,
}

impl Session {
    #[must_use]
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials,
            token: Mutex::new(None),
        }
    }

    /// A session that never logs in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.credentials.is_none()
    }

    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// The currently cached token, if any.
    #[must_use]
    pub fn cached_token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    /// Drop the cached token; the next call logs in again.
    pub fn invalidate(&self) {
        self.token.lock().take();
    }

    /// Run `operation` with a valid token.
    ///
    /// Anonymous sessions pass an empty token and never log in. Otherwise the
    /// cached token is used, logging in first if there is none. If the
    /// operation fails with an authentication fault, the token is dropped, a
    /// single new login is performed and the operation is retried once; a
    /// second authentication fault is returned as `ClientError::FatalAuth`.
    /// Every other error is returned unchanged and keeps the cached token.
    ///
    /// # Errors
    /// Returns the operation's error, a login failure, or `ClientError::FatalAuth`.
    pub fn with_token<A, T, F>(&self, authenticator: &A, mut operation: F) -> Result<T>
    where
        A: Authenticator + ?Sized,
        F: FnMut(&str) -> Result<T>,
    {
        let Some(credentials) = &self.credentials else {
            return operation("");
        };

        let token = match self.cached_token() {
            Some(token) => token,
            None => self.login(authenticator, credentials)?,
        };

        match operation(&token) {
            Err(err) if err.is_auth_fault() => {
                warn!(username = %credentials.username(), error = %err, "Token rejected, logging in again");
                self.invalidate();

                let token = self.login(authenticator, credentials)?;
                match operation(&token) {
                    Err(ClientError::Fault(fault)) if fault.is_auth() => {
                        self.invalidate();
                        Err(ClientError::FatalAuth(fault))
                    }
                    result => result,
                }
            }
            result => result,
        }
    }

    fn login<A>(&self, authenticator: &A, credentials: &Credentials) -> Result<String>
    where
        A: Authenticator + ?Sized,
    {
        debug!(username = %credentials.username(), "Logging in");

        let token = authenticator
            .login(credentials.username(), credentials.password())
            .map_err(|fault| {
                if fault.is_auth() {
                    ClientError::FatalAuth(fault)
                } else {
                    ClientError::Fault(fault)
                }
            })?;

        *self.token.lock() = Some(token.clone());
        Ok(token)
    }
}
