//! Share Password Value Object
//!
//! The project-wide password clients type on the share page. Only the
//! Argon2id hash is ever stored.

use platform::password::{ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError};
use std::fmt;

/// Error creating a share password
#[derive(Debug)]
pub enum SharePasswordError {
    Policy(PasswordPolicyError),
    Hash(PasswordHashError),
}

impl fmt::Display for SharePasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy(e) => write!(f, "{e}"),
            Self::Hash(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SharePasswordError {}

/// Hashed share password
#[derive(Clone)]
pub struct SharePassword(HashedPassword);

impl SharePassword {
    /// Validate a newly chosen password against the policy and hash it
    ///
    /// Returns the clear text too so the caller can run the breach check.
    pub fn create(
        raw: String,
        pepper: Option<&[u8]>,
    ) -> Result<(Self, ClearTextPassword), SharePasswordError> {
        let clear = ClearTextPassword::new(raw).map_err(SharePasswordError::Policy)?;
        let hash = clear.hash(pepper).map_err(SharePasswordError::Hash)?;
        Ok((Self(hash), clear))
    }

    pub fn from_hash(hash: HashedPassword) -> Self {
        Self(hash)
    }

    /// Load from the stored PHC string
    pub fn from_phc_string(phc: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(phc).map(Self)
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Check a submitted password
    pub fn verify(&self, candidate: &str, pepper: Option<&[u8]>) -> bool {
        let candidate = ClearTextPassword::candidate(candidate.to_string());
        if candidate.is_empty() {
            return false;
        }
        self.0.verify(&candidate, pepper)
    }
}

impl fmt::Debug for SharePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharePassword").field(&"[HASH]").finish()
    }
}
