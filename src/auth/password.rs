/// Password Hashing and Verification
///
/// bcrypt over `password || pepper`. The pepper is a server-wide secret kept
/// outside the database, on top of the per-hash salt bcrypt generates.
///
/// bcrypt only reads the first 72 bytes of its input and drops the rest
/// without complaint. Peppered input longer than that is refused outright,
/// otherwise the tail of the pepper (or all of it) would silently stop
/// counting.

use bcrypt::{hash, verify};

use crate::error::{AuthError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
/// Bytes of input bcrypt actually hashes
pub const BCRYPT_MAX_INPUT: usize = 72;

/// Salted + peppered password hashing.
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: Vec<u8>,
    cost: u32,
    /// Hash checked against when the user does not exist, so both login
    /// failure paths cost one bcrypt verification.
    dummy_hash: String,
}

impl PasswordHasher {
    /// # Errors
    /// `HashingFailure` if the dummy hash cannot be computed (bad cost, or a
    /// pepper that leaves no room for a password).
    pub fn new(pepper: impl AsRef<[u8]>, cost: u32) -> Result<Self, AuthError> {
        let mut hasher = Self {
            pepper: pepper.as_ref().to_vec(),
            cost,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash("dummy-pw")?;
        Ok(hasher)
    }

    /// Longest password (in bytes) that still hashes together with the
    /// whole pepper.
    pub fn max_password_length(&self) -> usize {
        BCRYPT_MAX_INPUT.saturating_sub(self.pepper.len())
    }

    pub fn accepts(&self, password: &str) -> bool {
        password.len() <= self.max_password_length()
    }

    /// Hash a password using bcrypt
    ///
    /// # Errors
    /// `HashingFailure` when bcrypt fails or the peppered input would be
    /// truncated; there is no weaker fallback.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash(self.peppered(password)?, self.cost)
            .map_err(|e| AuthError::HashingFailure(format!("failed to hash password: {}", e)))
    }

    /// Verify a password against its hash.
    ///
    /// A mismatch is `Ok(false)`. An unreadable hash, or input too long to
    /// carry the whole pepper, is an error.
    pub fn verify(&self, hashed_password: &str, password: &str) -> Result<bool, AuthError> {
        verify(self.peppered(password)?, hashed_password)
            .map_err(|e| AuthError::HashingFailure(format!("failed to verify password: {}", e)))
    }

    /// Spend one verification's worth of work without a real user behind it.
    pub fn verify_dummy(&self) {
        let _ = self.verify(&self.dummy_hash, "not-the-dummy");
    }

    fn peppered(&self, password: &str) -> Result<Vec<u8>, AuthError> {
        if !self.accepts(password) {
            return Err(AuthError::HashingFailure(format!(
                "password exceeds {} bytes with pepper applied",
                BCRYPT_MAX_INPUT
            )));
        }

        let mut input = Vec::with_capacity(password.len() + self.pepper.len());
        input.extend_from_slice(password.as_bytes());
        input.extend_from_slice(&self.pepper);
        Ok(input)
    }
}

/// Validate password strength requirements for new accounts
///
/// Requirements:
/// - 8 to `max_length` bytes
/// - At least one digit
/// - At least one lowercase letter
/// - At least one uppercase letter
pub fn validate_password_strength(password: &str, max_length: usize) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }

    if password.len() > max_length {
        return Err(ValidationError::TooLong("password", max_length));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(ValidationError::WeakPassword);
    }

    Ok(())
}
