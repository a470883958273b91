/// Compact signed access tokens
///
/// Format: `base64url(header).base64url(payload).base64url(signature)` with
/// no padding, where the signature is HMAC-SHA256 over `header.payload`.
/// The algorithm is pinned to HS256; a header naming anything else is
/// rejected before the signature is even computed.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::payload::AccessTokenPayload;
use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// The only accepted signing algorithm
pub const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Signs and verifies access tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Sign a payload into a token string.
    ///
    /// Deterministic: the same payload always yields the same token.
    pub fn sign(&self, payload: &AccessTokenPayload) -> Result<String, AuthError> {
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(payload)?);
        let signature = self.signature(&signing_input)?;

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Fully verify a token: structure, algorithm, signature, then expiry.
    ///
    /// # Errors
    /// - `MalformedToken` if the token is not three decodable segments
    /// - `UnsupportedAlgorithm` if the header names anything but HS256
    /// - `InvalidSignature` if the signature does not match
    /// - `Expired` if `now` is past the payload's `expires_at`
    pub fn verify(&self, token: &str, now: i64) -> Result<AccessTokenPayload, AuthError> {
        let payload = self.verify_signed(token)?;

        if payload.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(payload)
    }

    /// Verify origin but tolerate staleness: same as [`verify`](Self::verify)
    /// without the expiry check.
    pub fn validate_structure_only(&self, token: &str) -> Result<AccessTokenPayload, AuthError> {
        self.verify_signed(token)
    }

    /// Read the subject out of a token WITHOUT checking its signature.
    ///
    /// Only a hint for locating a refresh token after the access token
    /// expired. The result must never authorize anything on its own.
    pub fn extract_subject_unverified(token: &str) -> Result<String, AuthError> {
        let [_, payload, _] = split_token(token)?;
        let payload: AccessTokenPayload = decode_segment(payload)?;

        if payload.subject.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        Ok(payload.subject)
    }

    fn verify_signed(&self, token: &str) -> Result<AccessTokenPayload, AuthError> {
        let [header, payload, signature] = split_token(token)?;

        let header_data: TokenHeader = decode_segment(header)?;
        if header_data.alg != ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(header_data.alg));
        }

        let expected = self.signature(&format!("{}.{}", header, payload))?;
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(AuthError::InvalidSignature);
        }

        // Signature holds from here on; only now look at the claims.
        let payload: AccessTokenPayload = decode_segment(payload)?;
        if payload.expires_at <= payload.issued_at {
            return Err(AuthError::MalformedToken);
        }

        Ok(payload)
    }

    fn signature(&self, signing_input: &str) -> Result<String, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::TokenEncoding(format!("HMAC key error: {e}")))?;
        mac.update(signing_input.as_bytes());

        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

fn split_token(token: &str) -> Result<[&str; 3], AuthError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok([header, payload, signature]),
        _ => Err(AuthError::MalformedToken),
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| AuthError::TokenEncoding(format!("failed to marshal JSON: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}
