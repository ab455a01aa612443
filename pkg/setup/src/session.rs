use serde::Serialize;
use uuid::Uuid;

/// The authenticated caller of a request.
///
/// Inserted into the request extensions by
/// [`BearerAuthLayer`](crate::middleware::BearerAuthLayer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Holder of a session token signed by this server.
    SelfIssued { user_id: Uuid, email: String },

    /// Holder of an ID token issued by an external identity provider.
    External {
        user_id: Uuid,
        email: String,
        issuer: String,
    },
}

/// How a [`Principal`] was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Jwt,
    Oidc,
}

impl Principal {
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::SelfIssued { user_id, .. } | Self::External { user_id, .. } => *user_id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::SelfIssued { email, .. } | Self::External { email, .. } => email,
        }
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::SelfIssued { .. } => AuthType::Jwt,
            Self::External { .. } => AuthType::Oidc,
        }
    }

    /// The provider that issued the credential, for external principals.
    pub fn issuer(&self) -> Option<&str> {
        match self {
            Self::SelfIssued { .. } => None,
            Self::External { issuer, .. } => Some(issuer),
        }
    }
}
