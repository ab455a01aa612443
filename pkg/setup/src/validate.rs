//! Validation of identifiers taken from request paths.
use http::StatusCode;
use uuid::Uuid;

use crate::ErrorStatus;

/// Parses a path identifier, recording it on the current span.
///
/// `kind` names the entity in the error message, e.g. `"order"`.
pub fn parse_id(value: &str, kind: &'static str) -> Result<Uuid, InvalidIdError> {
    let Ok(id) = Uuid::parse_str(value) else {
        return Err(InvalidIdError {
            kind,
            value: value.to_string(),
        });
    };

    tracing::Span::current().record("id", value);

    Ok(id)
}

#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} id: {value}")]
pub struct InvalidIdError {
    kind: &'static str,
    value: String,
}

impl ErrorStatus for InvalidIdError {
    fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
