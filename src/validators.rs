/// Input validators for signup and login payloads
///
/// 1. Length limits keep oversized input away from bcrypt and the database
/// 2. Email format check (RFC 5322, simplified)
/// 3. Control characters and injection-looking input are refused outright

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_USERNAME_LENGTH: usize = 64;
const MIN_USERNAME_LENGTH: usize = 3;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    // Letters, digits and a few separators; no leading separator
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} ._'-]*$").unwrap();

    static ref SQL_INJECTION_PATTERNS: [Regex; 4] = [
        Regex::new(r"(?i)\s+UNION\s+").unwrap(),
        Regex::new(r"(--|;|/\*|\*/)").unwrap(),
        Regex::new(r"(?i)\b(SLEEP|WAITFOR|BENCHMARK)\s*\(").unwrap(),
        Regex::new(r#"(?i)(\bOR\b|\bAND\b)\s*(['"][0-9]*['"]|[0-9]+)\s*=\s*(['"][0-9]*['"]|[0-9]+)"#).unwrap(),
    ];
}

/// Validates and normalizes an email address.
///
/// Surrounding whitespace is dropped and the address is lowercased, so
/// `John@Example.com` and `john@example.com` are the same account.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    if has_suspicious_email_patterns(trimmed) || contains_sql_injection_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("email"));
    }

    Ok(trimmed.to_lowercase())
}

/// Validates a display username
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username"));
    }

    let length = trimmed.chars().count();
    if length < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort("username", MIN_USERNAME_LENGTH));
    }

    if length > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username", MAX_USERNAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) || contains_sql_injection_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("username"));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username"));
    }

    Ok(trimmed.to_string())
}

fn has_suspicious_email_patterns(email: &str) -> bool {
    if email.contains('\0') || email.matches('@').count() != 1 {
        return true;
    }

    email
        .split('@')
        .next()
        .is_some_and(|local_part| local_part.len() > MAX_LOCAL_PART_LENGTH)
}

fn contains_sql_injection_patterns(input: &str) -> bool {
    SQL_INJECTION_PATTERNS.iter().any(|pattern| pattern.is_match(input))
}
