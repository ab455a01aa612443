use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
use std::marker::PhantomData;
use url::Url;

use crate::{error::Error, random::RandomSource};

/// Shortest code verifier allowed by RFC 7636.
pub const MIN_CODE_VERIFIER_LEN: usize = 43;

/// Longest code verifier allowed by RFC 7636.
pub const MAX_CODE_VERIFIER_LEN: usize = 128;

/// Helpers for the browser-facing half of the authorization code flow:
/// state, PKCE and the authorization URL.
#[derive(Default, Clone)]
pub struct OAuth<R> {
    _phantom: PhantomData<R>,
}

impl<R: RandomSource> OAuth<R> {
    /// Generates the OAuth `state` (CSRF protection token).
    #[must_use]
    pub fn generate_state() -> String {
        R::base64_url(32)
    }

    /// Generates a PKCE `code_verifier` of 43 to 128 characters.
    #[must_use]
    pub fn generate_code_verifier() -> String {
        let mut verifier = R::base64_url(64);
        while verifier.len() < MIN_CODE_VERIFIER_LEN {
            let chunk = R::base64_url(32);
            if chunk.is_empty() {
                break;
            }
            verifier.push_str(&chunk);
        }
        verifier.truncate(MAX_CODE_VERIFIER_LEN);
        verifier
    }

    /// Creates an S256 code challenge from a given PKCE code verifier.
    #[must_use]
    pub fn create_s256_code_challenge(code_verifier: &str) -> String {
        let digest = Sha256::digest(code_verifier.as_bytes());
        BASE64_URL_SAFE_NO_PAD.encode(digest)
    }

    /// Constructs the authorization URL, requesting offline access.
    ///
    /// The PKCE parameters are only added when a challenge is given.
    pub fn generate_authorization_url(
        auth_endpoint: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
        state: &str,
        code_challenge: Option<&str>,
    ) -> Result<String, Error> {
        let scopes = scopes.join(" ");
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
        ];
        if !scopes.is_empty() {
            params.push(("scope", scopes.as_str()));
        }
        params.push(("state", state));
        params.push(("access_type", "offline"));

        if let Some(challenge) = code_challenge {
            params.push(("code_challenge", challenge));
            params.push(("code_challenge_method", "S256"));
        }

        let url = Url::parse_with_params(auth_endpoint, &params)?;
        Ok(url.into())
    }
}
