//! Self-issued session tokens.
//!
//! Tokens are HMAC signed JWTs carrying the user id and email. There is no
//! revocation list, a token stays valid until it expires.
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifetime of a session token in seconds.
pub const SESSION_TOKEN_EXPIRY_SECONDS: i64 = 60 * 60 * 24;

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Claims of a self-issued session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies session tokens with a symmetric secret.
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionTokens {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for `user_id` that expires 24 hours after `now`.
    ///
    /// # Errors
    /// - [`TokenError::Issue`] if the token cannot be encoded
    pub fn issue(&self, user_id: Uuid, email: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims {
            user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(SESSION_TOKEN_EXPIRY_SECONDS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Issue)
    }

    /// Verifies expiry and signature of a token.
    ///
    /// Expiry is checked first, so an expired token is reported as expired
    /// whether or not its signature is valid.
    ///
    /// # Errors
    /// - [`TokenError::InvalidSignature`] if the algorithm is not HMAC or the signature does not match
    /// - [`TokenError::Expired`] if the token is past its expiry
    /// - [`TokenError::Malformed`] if the token cannot be decoded
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        if !HMAC_ALGORITHMS.contains(&header.alg) {
            return Err(TokenError::InvalidSignature);
        }

        let unverified = decode_unverified(token, header.alg)?;
        if unverified.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.validate_aud = false;

        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

/// Decodes the claims without checking signature or expiry.
fn decode_unverified(token: &str, alg: Algorithm) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::new(alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// Error for [`SessionTokens`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("malformed token")]
    Malformed,

    #[error("failed to issue token: {0}")]
    Issue(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => Self::InvalidSignature,
            _ => Self::Malformed,
        }
    }
}
