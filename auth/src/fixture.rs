#![cfg(test)]

use std::sync::Arc;

use common::mock::MockNow;
use oauth::mock::{MockIdentityProvider, MockRandom};
use oauth::{Audience, IdentityClaims, Profile, ProviderConfig, TokenSet};
use uuid::Uuid;

use crate::{config::AuthConfig, handle_callback::CallbackQuery, handler::Handler};

pub(crate) type MockHandler = Handler<MockIdentityProvider, MockRandom, MockNow>;

pub(crate) fn fixture_uuid() -> Uuid {
    Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap()
}

pub(crate) fn fixture_email() -> String {
    "jane@example.com".to_string()
}

pub(crate) fn fixture_config<F>(mut func: F) -> AuthConfig
where
    F: FnMut(&mut AuthConfig),
{
    let mut config = AuthConfig {
        provider: ProviderConfig {
            provider_url: "https://idp.test".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_url: "http://localhost:8181/api/auth/callback".to_string(),
            scopes: vec!["openid".to_string()],
        },
        use_pkce: false,
        cookie_secure: true,
        jwt_secret: "secret".to_string(),
        state_cookie_name: "oidc_state".to_string(),
    };
    func(&mut config);
    config
}

pub(crate) fn fixture_handler<F>(func: F) -> MockHandler
where
    F: FnMut(&mut AuthConfig),
{
    let config = fixture_config(func);
    let provider = MockIdentityProvider {
        provider_url: config.provider.provider_url.clone(),
        ..Default::default()
    };
    Handler::new(Arc::new(provider), config)
}

pub(crate) fn fixture_query<F>(mut func: F) -> CallbackQuery
where
    F: FnMut(&mut CallbackQuery),
{
    let mut query = CallbackQuery {
        code: Some("code".to_string()),
        state: Some("state".to_string()),
        error: None,
    };
    func(&mut query);
    query
}

pub(crate) fn fixture_token_set() -> TokenSet {
    TokenSet {
        access_token: "access-token".to_string(),
        token_type: Some("Bearer".to_string()),
        id_token: Some("id-token".to_string()),
        ..Default::default()
    }
}

pub(crate) fn fixture_claims() -> IdentityClaims {
    IdentityClaims {
        user_id: fixture_uuid(),
        email: fixture_email(),
        name: "Jane Doe".to_string(),
        picture: String::new(),
        issuer: "https://idp.test".to_string(),
        audience: Audience::single("client-id"),
        issued_at: 1_577_836_800,
        expires_at: 1_577_840_400,
    }
}

pub(crate) fn fixture_profile<F>(mut func: F) -> Profile
where
    F: FnMut(&mut Profile),
{
    let mut profile = Profile {
        id: fixture_uuid(),
        email: fixture_email(),
        name: "Jane Doe".to_string(),
        picture: "https://idp.test/jane.png".to_string(),
        provider: "oidc".to_string(),
    };
    func(&mut profile);
    profile
}
