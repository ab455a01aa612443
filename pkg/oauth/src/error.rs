/// Identity provider errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to build request body")]
    BuildRequestBody(#[from] serde_urlencoded::ser::Error),

    #[error("failed to build http client")]
    BuildHttpClient,

    #[error("failed to send request: {0}")]
    SendRequest(#[from] reqwest::Error),

    #[error("unexpected HTTP status code: {0}: {1}")]
    UnexpectedStatusCode(reqwest::StatusCode, String),

    #[error("parse URL: {0}")]
    ParseURL(#[from] url::ParseError),

    #[error("issuer mismatch: expected {expected}, got {got}")]
    IssuerMismatch { expected: String, got: String },

    #[error("provider has no userinfo endpoint")]
    MissingUserInfoEndpoint,

    #[error("failed to decode id token: {0}")]
    DecodeIdToken(#[from] jsonwebtoken::errors::Error),

    #[error("unsupported signing algorithm: {0:?}")]
    UnsupportedAlgorithm(jsonwebtoken::Algorithm),

    #[error("missing kid in token")]
    MissingKid,

    #[error("no matching jwk found")]
    NoMatchingJwk,

    #[error("malformed subject: {0}")]
    MalformedSubject(String),
}
