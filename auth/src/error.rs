use http::StatusCode;
use setup::ErrorStatus;
use thiserror::Error;

use crate::token::TokenError;

/// Error for the login, callback and logout operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("OIDC error: {0}")]
    ProviderError(String),

    #[error("Missing authorization code")]
    MissingAuthCode,

    #[error("Missing state parameter")]
    MissingState,

    #[error("Invalid state parameter")]
    StateMismatch,

    #[error("Missing PKCE verifier")]
    MissingPkceVerifier,

    #[error("Failed to build authorization url: {0}")]
    AuthorizationUrl(oauth::Error),

    #[error("Failed to exchange code: {0}")]
    ExchangeFailure(oauth::Error),

    #[error("Missing id_token in token response")]
    MissingIdentityToken,

    #[error("Failed to verify token: {0}")]
    VerificationFailure(oauth::Error),

    #[error("Failed to generate JWT token: {0}")]
    IssueToken(#[from] TokenError),
}

impl ErrorStatus for Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::ProviderError(_)
            | Self::MissingAuthCode
            | Self::MissingState
            | Self::StateMismatch
            | Self::MissingPkceVerifier => StatusCode::BAD_REQUEST,
            Self::AuthorizationUrl(_)
            | Self::ExchangeFailure(_)
            | Self::MissingIdentityToken
            | Self::VerificationFailure(_)
            | Self::IssueToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
