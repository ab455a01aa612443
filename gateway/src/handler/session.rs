use auth::{CallbackQuery, LOGOUT_CACHE_CONTROL, UserInfoResp};
use axum::{
    Extension, Json,
    body::Body,
    extract::{Query, State},
    response::Response,
};
use axum_macros::debug_handler;
use http::{
    HeaderMap, StatusCode,
    header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION},
};
use oauth::IdentityProvider;
use setup::{
    ErrorStatus as _,
    cookie::ResponseCookies as _,
    middleware::{RequestAuthenticator as _, bearer_token},
    session::Principal,
};
use shop::DBClient;
use tracing::{instrument, warn};

use crate::{AppState, error::OAuthError};

const JSON: &str = "application/json";
const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Redirects the browser to the identity provider.
///
/// Sets the state cookie and, with PKCE enabled, the verifier cookie.
#[instrument(skip_all, err)]
pub async fn start_login<P, D>(State(state): State<AppState<P, D>>) -> Result<Response, OAuthError>
where
    P: IdentityProvider,
    D: DBClient,
{
    let redirect = state.auth.start_login()?;

    let response = Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(LOCATION, &redirect.authorization_url)
        .with_cookies(state.auth.login_cookies(&redirect))
        .body(Body::empty())?;

    Ok(response)
}

/// Completes the login and returns a session token.
///
/// The login cookies are expired on every response, whether the login
/// succeeded or not.
#[instrument(skip_all, err)]
pub async fn handle_callback<P, D>(
    State(state): State<AppState<P, D>>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Result<Response, OAuthError>
where
    P: IdentityProvider,
    D: DBClient,
{
    let builder = Response::builder().with_cookies(state.auth.clear_login_cookies());

    let response = match state.auth.handle_callback(query, &headers).await {
        Ok(resp) => builder
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, JSON)
            .body(Body::from(serde_json::to_vec(&resp)?))?,
        Err(err) => {
            warn!(error = %err, "login callback rejected");
            builder
                .status(err.status())
                .header(CONTENT_TYPE, PLAIN_TEXT)
                .body(Body::from(err.to_string()))?
        }
    };

    Ok(response)
}

/// Tells the client to drop its session token and clears auth cookies.
///
/// A bearer credential is optional. If it resolves to a provider identity,
/// the provider's logout URL is included.
#[instrument(skip_all, err)]
pub async fn logout<P, D>(
    State(state): State<AppState<P, D>>,
    headers: HeaderMap,
) -> Result<Response, OAuthError>
where
    P: IdentityProvider,
    D: DBClient,
{
    let principal = match bearer_token(&headers) {
        Ok(token) => state.auth.authenticator().authenticate(token).await.ok(),
        Err(_) => None,
    };
    let body = state.auth.logout(principal.as_ref());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CACHE_CONTROL, LOGOUT_CACHE_CONTROL)
        .header(CONTENT_TYPE, JSON)
        .with_cookies(state.auth.logout_cookies())
        .body(Body::from(serde_json::to_vec(&body)?))?;

    Ok(response)
}

/// Returns the authenticated caller.
#[debug_handler]
#[instrument(skip_all)]
pub async fn user_info(Extension(principal): Extension<Principal>) -> Json<UserInfoResp> {
    Json(UserInfoResp::from(&principal))
}
