use async_trait::async_trait;

use crate::{
    error::Error,
    logout::logout_url,
    models::{IdentityClaims, Profile, TokenSet},
};

/// An OpenID Connect provider as seen by the relying party.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// The configured provider (issuer) URL.
    fn provider_url(&self) -> &str;

    /// Builds the URL the browser is redirected to for login.
    fn authorization_url(&self, state: &str, code_challenge: Option<&str>)
    -> Result<String, Error>;

    /// Exchanges an authorization code for tokens. The verifier must be the
    /// one whose challenge went into the authorization URL.
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenSet, Error>;

    /// Verifies signature, issuer, audience and expiry of an ID token.
    async fn verify_id_token(&self, raw_token: &str) -> Result<IdentityClaims, Error>;

    /// Fetches the user profile from the userinfo endpoint.
    async fn fetch_profile(&self, tokens: &TokenSet) -> Result<Profile, Error>;

    /// Provider-side logout URL, if the provider is a known one.
    fn logout_url(&self) -> Option<String> {
        logout_url(self.provider_url())
    }
}
