pub mod auth;
pub mod tracing;
pub use auth::{AuthenticateErr, BearerAuthLayer, RequestAuthenticator, bearer_token};
pub use tracing::TracingHttpServiceLayer;
