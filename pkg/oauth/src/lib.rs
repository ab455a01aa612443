//! OpenID Connect relying-party building blocks: PKCE and state helpers,
//! provider discovery, code exchange, ID token verification and user info.
mod audience;
mod client;
mod error;
mod logout;
#[cfg(any(test, feature = "mock"))]
mod mock_keys;
mod models;
mod oauth;
mod provider;
mod random;

pub use audience::Audience;
pub use client::OidcClient;
pub use error::Error;
pub use logout::logout_url;
pub use models::{IdentityClaims, Profile, ProviderConfig, ProviderMetadata, TokenSet};
pub use oauth::OAuth;
pub use provider::IdentityProvider;
pub use random::RandomSource;
pub use random::SecureRandom;

#[cfg(feature = "mock")]
pub mod mock;
