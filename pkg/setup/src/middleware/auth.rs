use crate::session::Principal;
use async_trait::async_trait;
use axum::body::Body;
use axum::response::IntoResponse as _;
use core::pin::Pin;
use http::{HeaderMap, Method, Request, Response, StatusCode, header::AUTHORIZATION};
use std::task::{Context, Poll};
use thiserror::Error;
use tower::{Layer, Service};

#[async_trait]
pub trait RequestAuthenticator: Send + Sync {
    /// Resolves a bearer token to the calling [`Principal`].
    ///
    /// # Errors
    /// - [`AuthenticateErr::InvalidCredential`] if no verifier accepts the token.
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthenticateErr>;
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// # Errors
/// - [`AuthenticateErr::MissingCredential`] if the header is absent or not a bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthenticateErr> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthenticateErr::MissingCredential)?;

    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthenticateErr::MissingCredential),
    }
}

/// Service produced by [`BearerAuthLayer`].
#[derive(Clone)]
pub struct BearerAuthService<S, A> {
    /// The inner service.
    inner: S,

    /// Resolves bearer tokens to principals.
    authenticator: A,
}

/// Authentication layer that requires a bearer credential on every request.
///
/// After successful authentication the middleware inserts the [`Principal`]
/// into the request's extensions allowing handlers to access the caller.
#[derive(Clone)]
pub struct BearerAuthLayer<A> {
    authenticator: A,
}

impl<A> BearerAuthLayer<A> {
    /// Creates a new [`BearerAuthLayer`].
    pub fn new(authenticator: A) -> Self {
        Self { authenticator }
    }
}

impl<S, A: Clone> Layer<S> for BearerAuthLayer<A> {
    type Service = BearerAuthService<S, A>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService {
            inner,
            authenticator: self.authenticator.clone(),
        }
    }
}

impl<S, ReqBody, A> Service<Request<ReqBody>> for BearerAuthService<S, A>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    A: RequestAuthenticator + Clone + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        // Allow preflight
        if request.method() == Method::OPTIONS {
            return Box::pin(self.inner.call(request));
        }

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let authenticator = self.authenticator.clone();

        Box::pin(async move {
            let token = match bearer_token(request.headers()) {
                Ok(token) => token.to_string(),
                Err(err) => return Ok(unauthorized(err)),
            };

            match authenticator.authenticate(&token).await {
                Ok(principal) => {
                    tracing::Span::current().record("user_id", principal.user_id().to_string());
                    request.extensions_mut().insert(principal);
                    inner.call(request).await
                }
                Err(err) => Ok(unauthorized(err)),
            }
        })
    }
}

fn unauthorized(err: AuthenticateErr) -> Response<Body> {
    tracing::debug!(error = %err, "rejected unauthenticated request");
    (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
}

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error for [`RequestAuthenticator::authenticate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AuthenticateErr {
    #[error("authorization header required")]
    MissingCredential,

    #[error("invalid token")]
    InvalidCredential,
}

#[cfg(test)]
mod tests {
    use std::future::Ready;
    use std::future::ready;
    use uuid::Uuid;

    use rstest::rstest;
    use tower::Service;

    use super::*;

    fn fixture_principal() -> Principal {
        Principal::SelfIssued {
            user_id: Uuid::nil(),
            email: "jane@example.com".to_string(),
        }
    }

    #[rstest]
    #[case::authenticated(
        Request::builder().header("Authorization", "Bearer token").body(()).unwrap(),
        Ok(fixture_principal()),
        StatusCode::OK,
        Some(fixture_principal())
    )]
    #[case::lowercase_scheme(
        Request::builder().header("Authorization", "bearer token").body(()).unwrap(),
        Ok(fixture_principal()),
        StatusCode::OK,
        Some(fixture_principal())
    )]
    #[case::skip_preflight_requests(
        Request::builder().method("OPTIONS").body(()).unwrap(),
        Err(AuthenticateErr::InvalidCredential),
        StatusCode::OK,
        None
    )]
    #[case::missing_header(
        Request::builder().body(()).unwrap(),
        Ok(fixture_principal()),
        StatusCode::UNAUTHORIZED,
        None
    )]
    #[case::not_a_bearer_credential(
        Request::builder().header("Authorization", "InvalidFormat").body(()).unwrap(),
        Ok(fixture_principal()),
        StatusCode::UNAUTHORIZED,
        None
    )]
    #[case::empty_token(
        Request::builder().header("Authorization", "Bearer ").body(()).unwrap(),
        Ok(fixture_principal()),
        StatusCode::UNAUTHORIZED,
        None
    )]
    #[case::invalid_token(
        Request::builder().header("Authorization", "Bearer token").body(()).unwrap(),
        Err(AuthenticateErr::InvalidCredential),
        StatusCode::UNAUTHORIZED,
        None
    )]
    #[tokio::test]
    async fn test_auth_middleware(
        #[case] request: Request<()>,
        #[case] authenticate_result: Result<Principal, AuthenticateErr>,
        #[case] want_status: StatusCode,
        #[case] want_principal: Option<Principal>,
    ) {
        // given
        let mut service = BearerAuthService {
            inner: MockService,
            authenticator: MockAuthenticator {
                response: authenticate_result,
            },
        };

        // when
        let resp = service.call(request).await.unwrap();

        // then
        assert_eq!(resp.status(), want_status);
        assert_eq!(resp.extensions().get::<Principal>().cloned(), want_principal);
    }

    /// Echoes the request's principal back through the response extensions.
    #[derive(Clone)]
    struct MockService;

    impl<ReqBody> Service<Request<ReqBody>> for MockService
    where
        ReqBody: Send + 'static,
    {
        type Response = Response<Body>;
        type Error = std::convert::Infallible;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
            let mut resp = Response::new(Body::empty());
            if let Some(principal) = req.extensions().get::<Principal>() {
                resp.extensions_mut().insert(principal.clone());
            }
            ready(Ok(resp))
        }
    }

    #[derive(Clone)]
    struct MockAuthenticator {
        response: Result<Principal, AuthenticateErr>,
    }

    #[async_trait]
    impl RequestAuthenticator for MockAuthenticator {
        async fn authenticate(&self, _: &str) -> Result<Principal, AuthenticateErr> {
            self.response.clone()
        }
    }
}
