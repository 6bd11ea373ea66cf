//! Passwords
//!
//! Argon2id hashing with an optional pepper, NFKC normalization and a
//! length/pattern policy for newly chosen passwords (admin accounts and
//! share pages). Clear text is zeroized on drop and redacted in `Debug`.
//!
//! Breach lookups use the Pwned Passwords range API: only the first five
//! hex digits of the SHA-1 leave the process.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use sha1::{Digest, Sha1};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Shortest accepted password, in code points
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest accepted password, in code points
pub const MAX_PASSWORD_LENGTH: usize = 128;

const PWNED_RANGE_URL: &str = "https://api.pwnedpasswords.com/range/";
const PWNED_TIMEOUT: Duration = Duration::from_secs(5);

static PWNED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(PWNED_TIMEOUT)
        .build()
        .unwrap_or_default()
});

/// Substrings that make a password guessable regardless of length
const WEAK_FRAGMENTS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

/// Whole passwords rejected outright (compared lower-cased)
const WEAK_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "abcdefgh",
    "letmein1",
    "welcome1",
    "admin123",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "trustno1",
    "changeme",
];

/// Policy violations for a newly chosen password
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Hashing and lookup failures
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// Non-fatal; callers log and move on
    #[error("Breach check failed: {0}")]
    BreachCheckFailed(String),
}

/// Clear text password, zeroized on drop
///
/// Not `Clone`. Build with [`ClearTextPassword::new`] when a password is
/// being set and with [`ClearTextPassword::candidate`] when one is typed.
///
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let chosen = ClearTextPassword::new("Cutting-Room-2024".to_string()).unwrap();
/// let hash = chosen.hash(None).unwrap();
/// let typed = ClearTextPassword::candidate("Cutting-Room-2024".to_string());
/// assert!(hash.verify(&typed, None));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize and check against the policy
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized = Self::candidate(raw);
        check_policy(&normalized.0)?;
        Ok(normalized)
    }

    /// Password presented for verification (sign-in, share page)
    ///
    /// NFKC only. A stored password may predate the current policy, and
    /// rejecting a guess early would reveal which rule it broke.
    pub fn candidate(raw: String) -> Self {
        let raw = Zeroizing::new(raw);
        Self(raw.nfkc().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Argon2id with default (OWASP) parameters and a random salt
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let input = self.peppered(pepper);
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(&input, &salt)
            .map(|hash| HashedPassword {
                phc: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))
    }

    /// Whether the password appears in a known breach
    ///
    /// Errors are expected when offline; treat them as "unknown".
    pub async fn check_breach(&self) -> Result<bool, PasswordHashError> {
        let digest = Sha1::digest(self.0.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02X}")).collect();
        let (prefix, suffix) = hex.split_at(5);

        let response = PWNED_CLIENT
            .get(format!("{PWNED_RANGE_URL}{prefix}"))
            .header("Add-Padding", "true")
            .send()
            .await
            .map_err(|e| PasswordHashError::BreachCheckFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PasswordHashError::BreachCheckFailed(format!(
                "range lookup returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PasswordHashError::BreachCheckFailed(e.to_string()))?;

        Ok(range_contains(&body, suffix))
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(self.0.as_bytes().to_vec());
        if let Some(pepper) = pepper {
            bytes.extend_from_slice(pepper);
        }
        bytes
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClearTextPassword([REDACTED])")
    }
}

/// Argon2id hash in PHC string form, safe to store
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    phc: String,
}

impl HashedPassword {
    /// Load a stored hash, rejecting anything that is not a PHC string
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let phc = s.into();
        PasswordHash::new(&phc).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { phc })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.phc
    }

    /// Constant-time check; the pepper must be the one used when hashing
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };
        Argon2::default()
            .verify_password(&password.peppered(pepper), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([HASH])")
    }
}

fn check_policy(password: &str) -> Result<(), PasswordPolicyError> {
    if password.trim().is_empty() {
        return Err(PasswordPolicyError::EmptyOrWhitespace);
    }

    let actual = password.chars().count();
    if actual < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual,
        });
    }
    if actual > MAX_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooLong {
            max: MAX_PASSWORD_LENGTH,
            actual,
        });
    }

    if password
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n'))
    {
        return Err(PasswordPolicyError::InvalidCharacter);
    }

    if is_weak(password) {
        return Err(PasswordPolicyError::CommonPattern);
    }
    Ok(())
}

fn is_weak(password: &str) -> bool {
    let lower = password.to_lowercase();

    let mut chars = lower.chars();
    let first = chars.next();
    let repeated = first.is_some_and(|first| chars.all(|c| c == first));

    repeated
        || is_digit_run(&lower)
        || WEAK_FRAGMENTS.iter().any(|f| lower.contains(f))
        || WEAK_PASSWORDS.contains(&lower.as_str())
}

/// Four or more digits counting up or down by one (wrapping 9/0), with
/// any other characters ignored
fn is_digit_run(s: &str) -> bool {
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 4 {
        return false;
    }
    let up = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let down = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);
    up || down
}

/// Range responses are `SUFFIX:COUNT` lines; padded entries have count 0
fn range_contains(body: &str, suffix: &str) -> bool {
    body.lines().any(|line| match line.trim().split_once(':') {
        Some((candidate, count)) => {
            candidate.eq_ignore_ascii_case(suffix) && count.trim() != "0"
        }
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_lengths() {
        assert!(matches!(
            ClearTextPassword::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        ));
        assert!(matches!(
            ClearTextPassword::new("Ab3-".repeat(33)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert!(matches!(
            ClearTextPassword::new("        ".to_string()),
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_policy_rejects_control_characters() {
        assert!(matches!(
            ClearTextPassword::new("Final\u{7}Grade-Mix".to_string()),
            Err(PasswordPolicyError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_policy_rejects_weak_passwords() {
        for weak in ["Password123", "myqwertykeys", "98765432", "zzzzzzzzzz", "ChangeMe"] {
            assert!(
                matches!(
                    ClearTextPassword::new(weak.to_string()),
                    Err(PasswordPolicyError::CommonPattern)
                ),
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_policy_accepts_reasonable_passwords() {
        assert!(ClearTextPassword::new("Colour-Grade-v7!".to_string()).is_ok());
        assert!(ClearTextPassword::new("パスワード安全です!".to_string()).is_ok());
    }

    #[test]
    fn test_digit_runs() {
        assert!(is_digit_run("a1234"));
        assert!(is_digit_run("7890"));
        assert!(is_digit_run("3210"));
        assert!(!is_digit_run("2024"));
        assert!(!is_digit_run("123"));
    }

    #[test]
    fn test_hash_and_verify_with_pepper() {
        let password = ClearTextPassword::candidate("Rough-Cut-Review".to_string());
        let pepper = b"server-side-pepper";
        let hashed = password.hash(Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));
        assert!(!hashed.verify(&password, Some(b"other")));

        let wrong = ClearTextPassword::candidate("Rough-Cut-Reviews".to_string());
        assert!(!hashed.verify(&wrong, Some(pepper)));
    }

    #[test]
    fn test_stored_hash_reloads() {
        let password = ClearTextPassword::candidate("Rough-Cut-Review".to_string());
        let hashed = password.hash(None).unwrap();
        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&password, None));

        assert!(HashedPassword::from_phc_string("plaintext").is_err());
    }

    #[test]
    fn test_candidate_is_normalized_not_validated() {
        assert!(!ClearTextPassword::candidate("abc".to_string()).is_empty());
        assert!(ClearTextPassword::candidate(String::new()).is_empty());

        // Full-width letters normalize to ASCII under NFKC
        let hashed = ClearTextPassword::new("Screening2024!".to_string())
            .unwrap()
            .hash(None)
            .unwrap();
        let typed = ClearTextPassword::candidate("Ｓｃｒｅｅｎｉｎｇ2024!".to_string());
        assert!(hashed.verify(&typed, None));
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = ClearTextPassword::candidate("Rough-Cut-Review".to_string());
        let hashed = password.hash(None).unwrap();
        assert!(!format!("{password:?}").contains("Rough"));
        assert!(!format!("{hashed:?}").contains("argon2"));
    }

    #[test]
    fn test_range_body_parsing() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:3\r\n\
                    00D4F6E8FA6EECAD2A3AA415EEC418D38EC:0\r\n";
        assert!(range_contains(body, "0018a45c4d1def81644b54ab7f969b88d65"));
        // Padding rows never count
        assert!(!range_contains(body, "00D4F6E8FA6EECAD2A3AA415EEC418D38EC"));
        assert!(!range_contains(body, "FFFF"));
    }
}
