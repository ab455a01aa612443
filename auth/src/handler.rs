//! # Login with an external identity provider
//! - The client is redirected to the provider with a fresh `state` (and a
//!   PKCE challenge when enabled); both are remembered in short-lived cookies
//! - The provider redirects back with an authorization code
//! - The server checks the `state`, exchanges the code for tokens and
//!   verifies the ID token against the provider's keys
//! - The server issues its own session token for the user
//!
//! Afterwards a request is accepted with either the self-issued session token
//! or a provider ID token, see [`crate::Authenticator`].
use std::marker::PhantomData;
use std::sync::Arc;

use common::Now;
use oauth::{IdentityProvider, RandomSource};
use setup::cookie::{Cookie, OIDC_PKCE_COOKIE, create_expired_cookie};

use crate::{authenticate::Authenticator, config::AuthConfig, token::SessionTokens};

pub struct Handler<P, R, N> {
    pub provider: Arc<P>,
    pub tokens: SessionTokens,
    pub config: AuthConfig,
    _phantom: PhantomData<(R, N)>,
}

impl<P, R, N> Handler<P, R, N>
where
    P: IdentityProvider,
    R: RandomSource,
    N: Now,
{
    pub fn new(provider: Arc<P>, config: AuthConfig) -> Self {
        Self {
            provider,
            tokens: SessionTokens::new(&config.jwt_secret),
            config,
            _phantom: PhantomData,
        }
    }

    /// Request authenticator sharing this handler's keys and provider.
    pub fn authenticator(&self) -> Authenticator<P> {
        Authenticator::new(self.tokens.clone(), Arc::clone(&self.provider))
    }

    /// Cookies that end the login round trip. Attached to every callback response.
    pub fn clear_login_cookies(&self) -> Vec<Cookie> {
        vec![
            create_expired_cookie(&self.config.state_cookie_name, self.config.cookie_secure),
            create_expired_cookie(OIDC_PKCE_COOKIE, self.config.cookie_secure),
        ]
    }
}
