use std::sync::Arc;

use async_trait::async_trait;
use oauth::IdentityProvider;
use setup::middleware::{AuthenticateErr, RequestAuthenticator};
use setup::session::Principal;
use tracing::debug;

use crate::token::SessionTokens;

/// Accepts either a self-issued session token or a provider ID token.
///
/// The session token is tried first since it is verified locally.
pub struct Authenticator<P> {
    tokens: SessionTokens,
    provider: Arc<P>,
}

impl<P> Authenticator<P> {
    pub fn new(tokens: SessionTokens, provider: Arc<P>) -> Self {
        Self { tokens, provider }
    }
}

impl<P> Clone for Authenticator<P> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens.clone(),
            provider: Arc::clone(&self.provider),
        }
    }
}

#[async_trait]
impl<P: IdentityProvider> RequestAuthenticator for Authenticator<P> {
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthenticateErr> {
        match self.tokens.verify(token) {
            Ok(claims) => {
                return Ok(Principal::SelfIssued {
                    user_id: claims.user_id,
                    email: claims.email,
                });
            }
            Err(err) => debug!(error = %err, "not a session token"),
        }

        match self.provider.verify_id_token(token).await {
            Ok(claims) => Ok(Principal::External {
                user_id: claims.user_id,
                email: claims.email,
                issuer: claims.issuer,
            }),
            Err(err) => {
                debug!(error = %err, "not a provider id token");
                Err(AuthenticateErr::InvalidCredential)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{fixture_claims, fixture_email, fixture_uuid};
    use chrono::Utc;
    use oauth::mock::MockIdentityProvider;

    #[tokio::test]
    async fn test_authenticate_session_token() {
        // given
        let tokens = SessionTokens::new("secret");
        let token = tokens.issue(fixture_uuid(), &fixture_email(), Utc::now()).unwrap();
        let authenticator = Authenticator::new(tokens, Arc::new(MockIdentityProvider::default()));

        // when
        let got = authenticator.authenticate(&token).await;

        // then
        assert_eq!(
            got,
            Ok(Principal::SelfIssued {
                user_id: fixture_uuid(),
                email: fixture_email(),
            })
        );
    }

    #[tokio::test]
    async fn test_authenticate_provider_token() {
        // given
        let provider = MockIdentityProvider::default();
        *provider.verify_id_token_resp.lock().await = Some(Ok(fixture_claims()));
        let authenticator = Authenticator::new(SessionTokens::new("secret"), Arc::new(provider));

        // when
        let got = authenticator.authenticate("id-token").await;

        // then
        assert_eq!(
            got,
            Ok(Principal::External {
                user_id: fixture_uuid(),
                email: fixture_email(),
                issuer: "https://idp.test".to_string(),
            })
        );
        assert_eq!(
            *authenticator.provider.verify_id_token_req.lock().await,
            Some("id-token".to_string())
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_unknown_token() {
        // given
        let provider = MockIdentityProvider::default();
        *provider.verify_id_token_resp.lock().await = Some(Err(oauth::Error::NoMatchingJwk));
        let authenticator = Authenticator::new(SessionTokens::new("secret"), Arc::new(provider));

        // when
        let got = authenticator.authenticate("garbage").await;

        // then
        assert_eq!(got, Err(AuthenticateErr::InvalidCredential));
    }
}
