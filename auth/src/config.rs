use common::env::{env_flag, env_opt, env_or};
use oauth::ProviderConfig;
use setup::cookie::OIDC_STATE_COOKIE;

const DEFAULT_PROVIDER_URL: &str = "https://accounts.google.com";
const DEFAULT_REDIRECT_URL: &str = "http://localhost:8181/api/auth/callback";
const DEFAULT_SCOPES: &str = "openid offline_access email";
const DEFAULT_JWT_SECRET: &str = "secret";

/// Authentication settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub provider: ProviderConfig,
    /// Whether logins use a PKCE code challenge.
    pub use_pkce: bool,
    /// Whether auth cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
    /// Symmetric secret for self-issued session tokens.
    pub jwt_secret: String,
    pub state_cookie_name: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = env_opt("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET is not set, falling back to an insecure default");
            DEFAULT_JWT_SECRET.to_string()
        });

        Self {
            provider: ProviderConfig {
                provider_url: env_or("OIDC_PROVIDER_URL", DEFAULT_PROVIDER_URL),
                client_id: env_or("OIDC_CLIENT_ID", ""),
                client_secret: env_or("OIDC_CLIENT_SECRET", ""),
                redirect_url: env_or("OIDC_REDIRECT_URL", DEFAULT_REDIRECT_URL),
                scopes: parse_scopes(&env_or("OIDC_SCOPES", DEFAULT_SCOPES)),
            },
            use_pkce: env_flag("OIDC_USE_PKCE", false),
            cookie_secure: env_flag("OIDC_COOKIE_SECURE", true),
            jwt_secret,
            state_cookie_name: env_or("OIDC_STATE_COOKIE_NAME", OIDC_STATE_COOKIE),
        }
    }
}

/// Splits a scope list on spaces or commas.
pub(crate) fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split([' ', ','])
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}
