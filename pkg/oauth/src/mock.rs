//! Test doubles for crates depending on `oauth`.
use async_trait::async_trait;
use tokio::sync::Mutex;

pub use crate::mock_keys::{TEST_KID, sign_rs256, test_jwks};
use crate::{
    IdentityClaims, IdentityProvider, OAuth, Profile, RandomSource, TokenSet, error::Error,
};

/// Authorization endpoint used by [`MockIdentityProvider`].
pub const MOCK_AUTHORIZATION_ENDPOINT: &str = "https://idp.test/authorize";

/// Mock random generator for testing.
#[derive(Default, Clone)]
pub struct MockRandom;

impl RandomSource for MockRandom {
    fn base64_url(_: usize) -> String {
        "secret-encoded".to_string()
    }
}

/// Identity provider returning preconfigured results.
///
/// Every async call consumes its configured response; calling a method
/// that was not configured panics.
#[derive(Default)]
pub struct MockIdentityProvider {
    pub provider_url: String,

    pub exchange_code_req: Mutex<Option<(String, Option<String>)>>,
    pub exchange_code_resp: Mutex<Option<Result<TokenSet, Error>>>,
    pub exchange_code_count: Mutex<usize>,

    pub verify_id_token_req: Mutex<Option<String>>,
    pub verify_id_token_resp: Mutex<Option<Result<IdentityClaims, Error>>>,

    pub fetch_profile_resp: Mutex<Option<Result<Profile, Error>>>,
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn provider_url(&self) -> &str {
        &self.provider_url
    }

    fn authorization_url(
        &self,
        state: &str,
        code_challenge: Option<&str>,
    ) -> Result<String, Error> {
        OAuth::<MockRandom>::generate_authorization_url(
            MOCK_AUTHORIZATION_ENDPOINT,
            "client-id",
            "http://localhost:8181/api/auth/callback",
            &["openid".to_string()],
            state,
            code_challenge,
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenSet, Error> {
        *self.exchange_code_count.lock().await += 1;
        *self.exchange_code_req.lock().await =
            Some((code.to_string(), code_verifier.map(str::to_string)));
        self.exchange_code_resp
            .lock()
            .await
            .take()
            .expect("unexpected call to exchange_code")
    }

    async fn verify_id_token(&self, raw_token: &str) -> Result<IdentityClaims, Error> {
        *self.verify_id_token_req.lock().await = Some(raw_token.to_string());
        self.verify_id_token_resp
            .lock()
            .await
            .take()
            .expect("unexpected call to verify_id_token")
    }

    async fn fetch_profile(&self, _: &TokenSet) -> Result<Profile, Error> {
        self.fetch_profile_resp
            .lock()
            .await
            .take()
            .expect("unexpected call to fetch_profile")
    }
}
