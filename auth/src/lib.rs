//! Authentication: login through an OpenID Connect provider, self-issued
//! session tokens and request authentication.
mod authenticate;
mod config;
mod error;
mod fixture;
mod handle_callback;
mod handler;
mod logout;
mod start_login;
mod token;
mod user_info;

pub use authenticate::Authenticator;
pub use config::AuthConfig;
pub use error::Error;
pub use handle_callback::{CallbackQuery, CallbackResp};
pub use handler::Handler;
pub use logout::{LOGOUT_CACHE_CONTROL, LogoutInstructions, LogoutResp};
pub use start_login::LoginRedirect;
pub use token::{SESSION_TOKEN_EXPIRY_SECONDS, SessionClaims, SessionTokens, TokenError};
pub use user_info::UserInfoResp;
