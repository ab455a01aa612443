use common::Now;
use oauth::{IdentityProvider, RandomSource};
use serde::Serialize;
use setup::cookie::{Cookie, LEGACY_SESSION_COOKIES, create_expired_cookie};
use setup::session::{AuthType, Principal};

use crate::handler::Handler;

pub const LOGOUT_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResp {
    pub message: &'static str,
    pub instructions: LogoutInstructions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_logout_url: Option<String>,
}

/// What the client should do to finish the logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutInstructions {
    pub client_action: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_logout: Option<&'static str>,
}

impl<P, R, N> Handler<P, R, N>
where
    P: IdentityProvider,
    R: RandomSource,
    N: Now,
{
    /// Logs out the caller.
    ///
    /// Session tokens cannot be revoked, so the response only tells the
    /// client to drop its token. Callers that authenticated with a provider
    /// ID token additionally get the provider's logout URL, if it is known.
    pub fn logout(&self, principal: Option<&Principal>) -> LogoutResp {
        let mut resp = LogoutResp {
            message: "Successfully logged out",
            instructions: LogoutInstructions {
                client_action: "clear_token",
                description: "Remove the JWT token from client storage (localStorage, sessionStorage, etc.)",
                oidc_logout: None,
            },
            oidc_logout_url: None,
        };

        if let Some(principal) = principal {
            if principal.auth_type() == AuthType::Oidc
                && let Some(url) = self.provider.logout_url()
            {
                resp.oidc_logout_url = Some(url);
                resp.instructions.oidc_logout =
                    Some("Consider redirecting to oidc_logout_url to clear provider session");
            }
            tracing::info!(email = principal.email(), "logout");
        }

        resp
    }

    /// Cookies cleared on logout: the login round trip cookies and legacy
    /// session cookies.
    pub fn logout_cookies(&self) -> Vec<Cookie> {
        let secure = self.config.cookie_secure;
        let mut cookies = self.clear_login_cookies();
        cookies.extend(
            LEGACY_SESSION_COOKIES
                .iter()
                .map(|name| create_expired_cookie(*name, secure)),
        );
        cookies
    }
}
