use async_trait::async_trait;
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header,
    jwk::{Jwk, JwkSet},
};
use reqwest::{
    Client, Response,
    header::{ACCEPT, CONTENT_TYPE},
    redirect::Policy,
};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{
    error::Error,
    models::{
        IdTokenPayload, IdentityClaims, Profile, ProviderConfig, ProviderMetadata, TokenSet,
        UserInfo,
    },
    oauth::OAuth,
    provider::IdentityProvider,
    random::SecureRandom,
};

const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// Minimum time between two fetches of the provider's JWKS.
const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// OpenID Connect client bound to one discovered provider.
///
/// The provider's JWKS is cached and refetched when a token refers to an
/// unknown key id, at most once per [`JWKS_REFRESH_INTERVAL`].
pub struct OidcClient {
    config: ProviderConfig,
    metadata: ProviderMetadata,
    http: Client,
    jwks: RwLock<KeyCache>,
}

#[derive(Default)]
struct KeyCache {
    keys: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn is_fresh(&self) -> bool {
        self.fetched_at
            .is_some_and(|at| at.elapsed() < JWKS_REFRESH_INTERVAL)
    }

    fn find(&self, kid: Option<&str>) -> Result<Option<DecodingKey>, Error> {
        match &self.keys {
            Some(jwks) => find_key(jwks, kid),
            None => Ok(None),
        }
    }
}

impl OidcClient {
    /// Fetches the provider metadata and builds a client.
    ///
    /// # Errors
    /// - the discovery document cannot be fetched or decoded
    /// - the discovered issuer differs from the configured provider URL
    #[instrument(skip(config), fields(provider = %config.provider_url), err)]
    pub async fn discover(config: ProviderConfig) -> Result<Self, Error> {
        let http = build_http_client()?;
        let url = format!(
            "{}{DISCOVERY_PATH}",
            config.provider_url.trim_end_matches('/')
        );
        let metadata: ProviderMetadata = read_json(http.get(url).send().await?).await?;

        let expected = config.provider_url.trim_end_matches('/');
        if metadata.issuer.trim_end_matches('/') != expected {
            return Err(Error::IssuerMismatch {
                expected: expected.to_string(),
                got: metadata.issuer,
            });
        }

        Ok(Self::with_http(config, metadata, http))
    }

    /// Builds a client from already known metadata.
    ///
    /// # Errors
    /// - the http client cannot be built
    pub fn new(config: ProviderConfig, metadata: ProviderMetadata) -> Result<Self, Error> {
        Ok(Self::with_http(config, metadata, build_http_client()?))
    }

    fn with_http(config: ProviderConfig, metadata: ProviderMetadata, http: Client) -> Self {
        Self {
            config,
            metadata,
            http,
            jwks: RwLock::new(KeyCache::default()),
        }
    }

    /// Seeds the key cache. An unknown key id still triggers one fetch.
    #[must_use]
    pub fn with_jwks(self, jwks: JwkSet) -> Self {
        Self {
            jwks: RwLock::new(KeyCache {
                keys: Some(jwks),
                fetched_at: None,
            }),
            ..self
        }
    }

    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, Error> {
        {
            let cache = self.jwks.read().await;
            if let Some(key) = cache.find(kid)? {
                return Ok(key);
            }
            if cache.is_fresh() {
                debug!(?kid, "unknown key id, provider keys fetched recently");
                return Err(Error::NoMatchingJwk);
            }
        }

        // The write lock is held across the fetch so concurrent misses share it.
        let mut cache = self.jwks.write().await;
        if cache.is_fresh() {
            return cache.find(kid)?.ok_or(Error::NoMatchingJwk);
        }

        debug!(jwks_uri = %self.metadata.jwks_uri, "refreshing provider keys");
        cache.fetched_at = Some(Instant::now());
        let jwks: JwkSet = read_json(self.http.get(&self.metadata.jwks_uri).send().await?).await?;
        let key = find_key(&jwks, kid)?;
        cache.keys = Some(jwks);

        key.ok_or(Error::NoMatchingJwk)
    }
}

#[async_trait]
impl IdentityProvider for OidcClient {
    fn provider_url(&self) -> &str {
        &self.config.provider_url
    }

    fn authorization_url(
        &self,
        state: &str,
        code_challenge: Option<&str>,
    ) -> Result<String, Error> {
        OAuth::<SecureRandom>::generate_authorization_url(
            &self.metadata.authorization_endpoint,
            &self.config.client_id,
            &self.config.redirect_url,
            &self.config.scopes,
            state,
            code_challenge,
        )
    }

    #[instrument(skip_all, err)]
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenSet, Error> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
        ];
        if let Some(verifier) = code_verifier {
            params.push(("code_verifier", verifier));
        }
        let body = serde_urlencoded::to_string(&params)?;

        let response = self
            .http
            .post(&self.metadata.token_endpoint)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        read_json(response).await
    }

    #[instrument(skip_all, err)]
    async fn verify_id_token(&self, raw_token: &str) -> Result<IdentityClaims, Error> {
        let header = decode_header(raw_token)?;
        if !is_asymmetric(header.alg) {
            return Err(Error::UnsupportedAlgorithm(header.alg));
        }

        let key = self.decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.set_issuer(&[&self.metadata.issuer]);
        validation.set_audience(&[&self.config.client_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let data = decode::<IdTokenPayload>(raw_token, &key, &validation)?;
        IdentityClaims::try_from(data.claims)
    }

    #[instrument(skip_all, err)]
    async fn fetch_profile(&self, tokens: &TokenSet) -> Result<Profile, Error> {
        let Some(endpoint) = &self.metadata.userinfo_endpoint else {
            return Err(Error::MissingUserInfoEndpoint);
        };

        let response = self
            .http
            .get(endpoint)
            .bearer_auth(&tokens.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let info: UserInfo = read_json(response).await?;
        Profile::try_from(info)
    }
}

fn build_http_client() -> Result<Client, Error> {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .map_err(|_| Error::BuildHttpClient)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::UnexpectedStatusCode(status, body));
    }
    Ok(response.json::<T>().await?)
}

fn find_key(jwks: &JwkSet, kid: Option<&str>) -> Result<Option<DecodingKey>, Error> {
    let jwk: Option<&Jwk> = match kid {
        Some(kid) => jwks.find(kid),
        None if jwks.keys.len() == 1 => jwks.keys.first(),
        None => return Err(Error::MissingKid),
    };
    Ok(jwk.map(DecodingKey::from_jwk).transpose()?)
}

fn is_asymmetric(alg: Algorithm) -> bool {
    !matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}
