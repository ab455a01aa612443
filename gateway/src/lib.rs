//! HTTP surface of the storefront: login, customers, catalogue and orders.
pub mod error;
pub mod handler;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use common::{SystemNow, UuidV4Generator};
use oauth::{IdentityProvider, SecureRandom};
use setup::middleware::{BearerAuthLayer, TracingHttpServiceLayer};
use shop::DBClient;
use tower_http::cors::CorsLayer;

use crate::handler::{session, store};

pub const SERVICE_NAME: &str = "gateway";
pub const HTTP_PORT: u16 = 8181;

pub type AuthHandler<P> = auth::Handler<P, SecureRandom, SystemNow>;
pub type ShopHandler<D> = shop::Handler<D, UuidV4Generator, SystemNow>;

/// Shared state of all routes.
pub struct AppState<P, D> {
    pub auth: Arc<AuthHandler<P>>,
    pub shop: Arc<ShopHandler<D>>,
}

impl<P, D> AppState<P, D> {
    pub fn new(auth: AuthHandler<P>, shop: ShopHandler<D>) -> Self {
        Self {
            auth: Arc::new(auth),
            shop: Arc::new(shop),
        }
    }
}

impl<P, D> Clone for AppState<P, D> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            shop: Arc::clone(&self.shop),
        }
    }
}

/// Builds the application router.
///
/// Customer routes and `/api/auth/userinfo` require a bearer credential,
/// everything else is public.
pub fn router<P, D>(state: AppState<P, D>) -> Router
where
    P: IdentityProvider,
    D: DBClient,
{
    let authenticator = state.auth.authenticator();

    let protected = Router::new()
        .route("/api/auth/userinfo", get(session::user_info))
        .route("/api/customers", post(store::create_customer::<P, D>))
        .route("/api/customers/{id}", get(store::get_customer::<P, D>))
        .route(
            "/api/customers/{id}/orders",
            get(store::list_customer_orders::<P, D>),
        )
        .route_layer(BearerAuthLayer::new(authenticator));

    let public = Router::new()
        .route("/health", get(handler::health))
        .route("/api/auth/login", get(session::start_login::<P, D>))
        .route("/api/auth/callback", get(session::handle_callback::<P, D>))
        .route("/api/auth/logout", post(session::logout::<P, D>))
        .route(
            "/api/categories",
            post(store::create_category::<P, D>).get(store::list_categories::<P, D>),
        )
        .route("/api/categories/{id}", get(store::get_category::<P, D>))
        .route(
            "/api/categories/{id}/children",
            get(store::list_child_categories::<P, D>),
        )
        .route(
            "/api/products",
            post(store::create_product::<P, D>).get(store::list_products::<P, D>),
        )
        .route("/api/products/{id}", get(store::get_product::<P, D>))
        .route(
            "/api/products/category/{id}",
            get(store::list_products_by_category::<P, D>),
        )
        .route(
            "/api/products/category/{id}/average-price",
            get(store::average_price_by_category::<P, D>),
        )
        .route("/api/orders", post(store::create_order::<P, D>))
        .route("/api/orders/{id}", get(store::get_order::<P, D>))
        .route(
            "/api/orders/{id}/status",
            put(store::update_order_status::<P, D>),
        );

    protected
        .merge(public)
        .with_state(state)
        .layer(CorsLayer::very_permissive())
        .layer(TracingHttpServiceLayer)
}
