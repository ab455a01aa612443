use oauth::{IdentityProvider, OAuth, RandomSource};
use setup::cookie::{Cookie, OIDC_PKCE_COOKIE, create_oauth_cookie};
use tracing::instrument;

use common::Now;

use crate::{error::Error, handler::Handler};

/// Where to send the browser to start a login, and what to remember until
/// the provider redirects back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub authorization_url: String,
    pub state: String,
    pub code_verifier: Option<String>,
}

impl<P, R, N> Handler<P, R, N>
where
    P: IdentityProvider,
    R: RandomSource,
    N: Now,
{
    /// Starts a login with the identity provider.
    ///
    /// # Errors
    /// - generating the authorization url
    #[instrument(skip_all, err)]
    pub fn start_login(&self) -> Result<LoginRedirect, Error> {
        let state = OAuth::<R>::generate_state();

        let (code_verifier, challenge) = if self.config.use_pkce {
            let verifier = OAuth::<R>::generate_code_verifier();
            let challenge = OAuth::<R>::create_s256_code_challenge(&verifier);
            (Some(verifier), Some(challenge))
        } else {
            (None, None)
        };

        let authorization_url = self
            .provider
            .authorization_url(&state, challenge.as_deref())
            .map_err(Error::AuthorizationUrl)?;

        Ok(LoginRedirect {
            authorization_url,
            state,
            code_verifier,
        })
    }

    /// Cookies remembering the state and PKCE verifier of `redirect`.
    pub fn login_cookies(&self, redirect: &LoginRedirect) -> Vec<Cookie> {
        let secure = self.config.cookie_secure;
        let mut cookies = vec![create_oauth_cookie(
            &self.config.state_cookie_name,
            &redirect.state,
            secure,
        )];
        if let Some(verifier) = &redirect.code_verifier {
            cookies.push(create_oauth_cookie(OIDC_PKCE_COOKIE, verifier, secure));
        }
        cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::fixture_handler;
    use oauth::mock::MOCK_AUTHORIZATION_ENDPOINT;
    use rstest::rstest;

    #[rstest]
    #[case::without_pkce(false)]
    #[case::with_pkce(true)]
    fn test_start_login(#[case] use_pkce: bool) {
        // given
        let handler = fixture_handler(|config| config.use_pkce = use_pkce);

        // when
        let got = handler.start_login().unwrap();

        // then
        assert_eq!(got.state, "secret-encoded");
        assert!(got.authorization_url.starts_with(MOCK_AUTHORIZATION_ENDPOINT));
        assert!(got.authorization_url.contains("state=secret-encoded"));
        assert_eq!(got.code_verifier.is_some(), use_pkce);
        assert_eq!(
            got.authorization_url.contains("code_challenge_method=S256"),
            use_pkce
        );
    }

    #[rstest]
    #[case::without_pkce(false, 1)]
    #[case::with_pkce(true, 2)]
    fn test_login_cookies(#[case] use_pkce: bool, #[case] want_count: usize) {
        // given
        let handler = fixture_handler(|config| config.use_pkce = use_pkce);
        let redirect = handler.start_login().unwrap();

        // when
        let got = handler.login_cookies(&redirect);

        // then
        assert_eq!(got.len(), want_count);
        assert_eq!(
            got[0].to_string(),
            "oidc_state=secret-encoded; Max-Age=300; Path=/; Secure; HttpOnly; SameSite=Lax"
        );
        if let Some(verifier) = redirect.code_verifier {
            assert_eq!(got[1], create_oauth_cookie(OIDC_PKCE_COOKIE, verifier, true));
        }
    }
}
