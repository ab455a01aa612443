use common::Now;
use oauth::{IdentityProvider, Profile, RandomSource};
use serde::{Deserialize, Serialize};
use setup::cookie::{CookieReader, OIDC_PKCE_COOKIE};
use tracing::{instrument, warn};

use crate::{error::Error, handler::Handler, token::SESSION_TOKEN_EXPIRY_SECONDS};

/// Query parameters of the provider redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackResp {
    pub user: Profile,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl<P, R, N> Handler<P, R, N>
where
    P: IdentityProvider,
    R: RandomSource,
    N: Now,
{
    /// Completes a login: checks the state, exchanges the authorization code,
    /// verifies the ID token and issues a session token.
    ///
    /// A failing userinfo request does not fail the login, the profile is
    /// then built from the ID token claims.
    ///
    /// # Errors
    /// - provider reported an error, or code or state are missing
    /// - state does not match the state cookie
    /// - PKCE is enabled and the verifier cookie is missing
    /// - code exchange or ID token verification failed
    #[instrument(skip_all, err)]
    pub async fn handle_callback(
        &self,
        query: CallbackQuery,
        cookies: &impl CookieReader,
    ) -> Result<CallbackResp, Error> {
        if let Some(error) = non_empty(query.error) {
            return Err(Error::ProviderError(error));
        }
        let code = non_empty(query.code).ok_or(Error::MissingAuthCode)?;
        let state = non_empty(query.state).ok_or(Error::MissingState)?;

        match cookies.cookie(&self.config.state_cookie_name) {
            Some(expected) if constant_time_eq(expected.as_bytes(), state.as_bytes()) => {}
            _ => return Err(Error::StateMismatch),
        }

        let code_verifier = if self.config.use_pkce {
            Some(
                cookies
                    .cookie(OIDC_PKCE_COOKIE)
                    .ok_or(Error::MissingPkceVerifier)?,
            )
        } else {
            None
        };

        let tokens = self
            .provider
            .exchange_code(&code, code_verifier.as_deref())
            .await
            .map_err(Error::ExchangeFailure)?;

        let raw_id_token = tokens
            .id_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingIdentityToken)?;

        let claims = self
            .provider
            .verify_id_token(raw_id_token)
            .await
            .map_err(Error::VerificationFailure)?;

        let user = match self.provider.fetch_profile(&tokens).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, "userinfo request failed, using id token claims");
                claims.profile()
            }
        };

        let access_token = self.tokens.issue(user.id, &user.email, N::now())?;

        Ok(CallbackResp {
            user,
            access_token,
            token_type: "Bearer",
            expires_in: SESSION_TOKEN_EXPIRY_SECONDS,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Compares two byte strings in time independent of where they differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::fixture::{
        fixture_claims, fixture_handler, fixture_profile, fixture_query, fixture_token_set,
    };
    use crate::token::tests::peek_claims;
    use http::StatusCode;
    use oauth::TokenSet;
    use rstest::rstest;
    use setup::ErrorStatus as _;

    /// Cookie jar that records which cookies were read.
    #[derive(Default)]
    struct MockCookies {
        state: Option<String>,
        pkce: Option<String>,
        reads: Mutex<Vec<String>>,
    }

    impl CookieReader for MockCookies {
        fn cookie(&self, name: &str) -> Option<String> {
            self.reads.lock().unwrap().push(name.to_string());
            match name {
                "oidc_state" => self.state.clone(),
                OIDC_PKCE_COOKIE => self.pkce.clone(),
                _ => None,
            }
        }
    }

    fn fixture_cookies() -> MockCookies {
        MockCookies {
            state: Some("state".to_string()),
            pkce: Some("verifier".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_handle_callback() {
        // given
        let handler = fixture_handler(|_| {});
        *handler.provider.exchange_code_resp.lock().await = Some(Ok(fixture_token_set()));
        *handler.provider.verify_id_token_resp.lock().await = Some(Ok(fixture_claims()));
        *handler.provider.fetch_profile_resp.lock().await = Some(Ok(fixture_profile(|_| {})));

        // when
        let got = handler
            .handle_callback(fixture_query(|_| {}), &fixture_cookies())
            .await
            .unwrap();

        // then
        assert_eq!(got.user, fixture_profile(|_| {}));
        assert_eq!(got.token_type, "Bearer");
        assert_eq!(got.expires_in, 86_400);
        let claims = peek_claims(&handler.tokens, &got.access_token);
        assert_eq!(claims.user_id, got.user.id);
        assert_eq!(claims.email, got.user.email);
        assert_eq!(
            *handler.provider.exchange_code_req.lock().await,
            Some(("code".to_string(), None))
        );
        assert_eq!(
            *handler.provider.verify_id_token_req.lock().await,
            Some("id-token".to_string())
        );
    }

    #[tokio::test]
    async fn test_handle_callback_falls_back_to_claims() {
        // given
        let handler = fixture_handler(|_| {});
        *handler.provider.exchange_code_resp.lock().await = Some(Ok(fixture_token_set()));
        *handler.provider.verify_id_token_resp.lock().await = Some(Ok(fixture_claims()));
        *handler.provider.fetch_profile_resp.lock().await =
            Some(Err(oauth::Error::MissingUserInfoEndpoint));

        // when
        let got = handler
            .handle_callback(fixture_query(|_| {}), &fixture_cookies())
            .await
            .unwrap();

        // then
        assert_eq!(got.user, fixture_claims().profile());
        assert_eq!(got.user.provider, "https://idp.test");
    }

    #[tokio::test]
    async fn test_handle_callback_sends_pkce_verifier() {
        // given
        let handler = fixture_handler(|config| config.use_pkce = true);
        *handler.provider.exchange_code_resp.lock().await = Some(Ok(fixture_token_set()));
        *handler.provider.verify_id_token_resp.lock().await = Some(Ok(fixture_claims()));
        *handler.provider.fetch_profile_resp.lock().await = Some(Ok(fixture_profile(|_| {})));

        // when
        let got = handler
            .handle_callback(fixture_query(|_| {}), &fixture_cookies())
            .await;

        // then
        assert!(got.is_ok());
        assert_eq!(
            *handler.provider.exchange_code_req.lock().await,
            Some(("code".to_string(), Some("verifier".to_string())))
        );
    }

    #[tokio::test]
    async fn test_handle_callback_provider_error_reads_no_cookie() {
        // given
        let handler = fixture_handler(|_| {});
        let cookies = fixture_cookies();
        let query = fixture_query(|q| q.error = Some("access_denied".to_string()));

        // when
        let got = handler.handle_callback(query, &cookies).await;

        // then
        let err = got.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "OIDC error: access_denied");
        assert!(cookies.reads.lock().unwrap().is_empty());
        assert_eq!(*handler.provider.exchange_code_count.lock().await, 0);
    }

    #[rstest]
    #[case::missing_code(fixture_query(|q| q.code = None), fixture_cookies(), false)]
    #[case::empty_code(fixture_query(|q| q.code = Some(String::new())), fixture_cookies(), false)]
    #[case::missing_state(fixture_query(|q| q.state = None), fixture_cookies(), false)]
    #[case::state_mismatch(
        fixture_query(|q| q.state = Some("forged".to_string())),
        fixture_cookies(),
        false
    )]
    #[case::state_differs_in_last_byte(
        fixture_query(|q| q.state = Some("statf".to_string())),
        fixture_cookies(),
        false
    )]
    #[case::state_prefix(
        fixture_query(|q| q.state = Some("stat".to_string())),
        fixture_cookies(),
        false
    )]
    #[case::missing_state_cookie(
        fixture_query(|_| {}),
        MockCookies { state: None, ..fixture_cookies() },
        false
    )]
    #[case::missing_pkce_cookie(
        fixture_query(|_| {}),
        MockCookies { pkce: None, ..fixture_cookies() },
        true
    )]
    #[tokio::test]
    async fn test_handle_callback_rejects_before_exchange(
        #[case] query: CallbackQuery,
        #[case] cookies: MockCookies,
        #[case] use_pkce: bool,
    ) {
        // given
        let handler = fixture_handler(|config| config.use_pkce = use_pkce);

        // when
        let got = handler.handle_callback(query, &cookies).await;

        // then
        assert_eq!(got.unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(*handler.provider.exchange_code_count.lock().await, 0);
    }

    #[rstest]
    #[case::exchange_failure(
        Err(oauth::Error::UnexpectedStatusCode(StatusCode::BAD_REQUEST, "invalid_grant".to_string())),
        None
    )]
    #[case::missing_id_token(Ok(TokenSet { id_token: None, ..fixture_token_set() }), None)]
    #[case::verification_failure(Ok(fixture_token_set()), Some(Err(oauth::Error::MissingKid)))]
    #[tokio::test]
    async fn test_handle_callback_provider_failures(
        #[case] exchange_resp: Result<TokenSet, oauth::Error>,
        #[case] verify_resp: Option<Result<oauth::IdentityClaims, oauth::Error>>,
    ) {
        // given
        let handler = fixture_handler(|_| {});
        *handler.provider.exchange_code_resp.lock().await = Some(exchange_resp);
        *handler.provider.verify_id_token_resp.lock().await = verify_resp;

        // when
        let got = handler
            .handle_callback(fixture_query(|_| {}), &fixture_cookies())
            .await;

        // then
        assert_eq!(got.unwrap_err().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[rstest]
    #[case::equal(b"state".as_slice(), b"state".as_slice(), true)]
    #[case::last_byte(b"state".as_slice(), b"statf".as_slice(), false)]
    #[case::first_byte(b"state".as_slice(), b"xtate".as_slice(), false)]
    #[case::shorter(b"state".as_slice(), b"stat".as_slice(), false)]
    #[case::empty(b"".as_slice(), b"".as_slice(), true)]
    fn test_constant_time_eq(#[case] a: &[u8], #[case] b: &[u8], #[case] want: bool) {
        // when
        let got = constant_time_eq(a, b);

        // then
        assert_eq!(got, want);
    }
}
