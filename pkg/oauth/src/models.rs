use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{audience::Audience, error::Error};

/// Static relying-party configuration for one identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Issuer URL, also the base for discovery.
    pub provider_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
}

/// Subset of the OpenID provider metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
}

/// Token endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Verified and normalized ID token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityClaims {
    /// The subject parsed as a user id.
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub issuer: String,
    pub audience: Audience,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl IdentityClaims {
    /// Profile derived from the claims alone, used when the userinfo call fails.
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
            provider: self.issuer.clone(),
        }
    }
}

/// User profile as reported to API clients after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub provider: String,
}

/// Raw ID token payload.
#[derive(Debug, Deserialize)]
pub(crate) struct IdTokenPayload {
    pub(crate) sub: String,
    pub(crate) iss: String,
    pub(crate) aud: Audience,
    pub(crate) exp: i64,
    #[serde(default)]
    pub(crate) iat: i64,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) picture: Option<String>,
}

impl TryFrom<IdTokenPayload> for IdentityClaims {
    type Error = Error;

    fn try_from(payload: IdTokenPayload) -> Result<Self, Error> {
        let user_id = parse_subject(&payload.sub)?;
        Ok(Self {
            user_id,
            email: payload.email.unwrap_or_default(),
            name: payload.name.unwrap_or_default(),
            picture: payload.picture.unwrap_or_default(),
            issuer: payload.iss,
            audience: payload.aud,
            issued_at: payload.iat,
            expires_at: payload.exp,
        })
    }
}

/// Raw userinfo endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct UserInfo {
    pub(crate) sub: String,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) picture: Option<String>,
}

pub(crate) const USERINFO_PROVIDER: &str = "oidc";

impl TryFrom<UserInfo> for Profile {
    type Error = Error;

    fn try_from(info: UserInfo) -> Result<Self, Error> {
        Ok(Self {
            id: parse_subject(&info.sub)?,
            email: info.email.unwrap_or_default(),
            name: info.name.unwrap_or_default(),
            picture: info.picture.unwrap_or_default(),
            provider: USERINFO_PROVIDER.to_string(),
        })
    }
}

fn parse_subject(sub: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(sub).map_err(|_| Error::MalformedSubject(sub.to_string()))
}
