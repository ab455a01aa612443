use std::sync::Arc;

use auth::{AuthConfig, SessionTokens};
use axum::{
    Router,
    body::{Body, to_bytes},
    response::Response,
};
use chrono::{TimeZone as _, Utc};
use gateway::{AppState, AuthHandler, ShopHandler, router};
use http::{Request, header::SET_COOKIE};
use oauth::{Audience, IdentityClaims, Profile, ProviderConfig, TokenSet, mock::MockIdentityProvider};
use serde_json::Value;
use shop::test_utils::{InMemoryDBClient, RecordingNotifier};
use shop::{
    Category, Customer, NotificationDispatcher, NotificationWorker, NotifyConfig, Order, OrderItem,
    OrderStatus, Product,
};
use tower::ServiceExt as _;
use uuid::Uuid;

pub(crate) const JWT_SECRET: &str = "integration-secret";

#[allow(dead_code)]
pub(crate) struct TestApp {
    pub(crate) router: Router,
    pub(crate) db: InMemoryDBClient,
    pub(crate) provider: Arc<MockIdentityProvider>,
    pub(crate) notifier: RecordingNotifier,
    pub(crate) worker: NotificationWorker,
}

impl TestApp {
    pub(crate) async fn send(&self, req: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible")
    }

    /// A session token as issued at login.
    pub(crate) fn session_token(&self, user_id: Uuid, email: &str) -> String {
        SessionTokens::new(JWT_SECRET)
            .issue(user_id, email, Utc::now())
            .unwrap()
    }
}

pub(crate) fn fixture_config<F>(mut func: F) -> AuthConfig
where
    F: FnMut(&mut AuthConfig),
{
    let mut config = AuthConfig {
        provider: ProviderConfig {
            provider_url: "https://idp.test".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_url: "http://localhost:8181/api/auth/callback".to_string(),
            scopes: vec!["openid".to_string()],
        },
        use_pkce: false,
        cookie_secure: true,
        jwt_secret: JWT_SECRET.to_string(),
        state_cookie_name: "oidc_state".to_string(),
    };
    func(&mut config);
    config
}

pub(crate) fn fixture_app<F>(db: InMemoryDBClient, func: F) -> TestApp
where
    F: FnMut(&mut AuthConfig),
{
    let config = fixture_config(func);
    let provider = Arc::new(MockIdentityProvider {
        provider_url: config.provider.provider_url.clone(),
        ..Default::default()
    });
    let auth = AuthHandler::new(Arc::clone(&provider), config);

    let notifier = RecordingNotifier::default();
    let (dispatcher, worker) = NotificationDispatcher::spawn(
        notifier.clone(),
        NotifyConfig {
            admin_email: "admin@example.com".to_string(),
            queue_capacity: 8,
        },
    );
    let shop = ShopHandler::new(db.clone(), Default::default(), dispatcher);

    TestApp {
        router: router(AppState::new(auth, shop)),
        db,
        provider,
        notifier,
        worker,
    }
}

pub(crate) fn user_id() -> Uuid {
    Uuid::from_u128(0x1111)
}

pub(crate) fn customer_id() -> Uuid {
    Uuid::from_u128(0x11)
}

pub(crate) fn category_id() -> Uuid {
    Uuid::from_u128(0x21)
}

pub(crate) fn product_id() -> Uuid {
    Uuid::from_u128(0x22)
}

pub(crate) fn order_id() -> Uuid {
    Uuid::from_u128(0x31)
}

pub(crate) fn fixture_token_set() -> TokenSet {
    TokenSet {
        access_token: "provider-access-token".to_string(),
        token_type: Some("Bearer".to_string()),
        id_token: Some("provider-id-token".to_string()),
        ..Default::default()
    }
}

pub(crate) fn fixture_claims() -> IdentityClaims {
    let now = Utc::now().timestamp();
    IdentityClaims {
        user_id: user_id(),
        email: "jane@example.com".to_string(),
        name: "Jane Doe".to_string(),
        picture: String::new(),
        issuer: "https://idp.test".to_string(),
        audience: Audience::single("client-id"),
        issued_at: now,
        expires_at: now + 3600,
    }
}

pub(crate) fn fixture_profile() -> Profile {
    Profile {
        id: user_id(),
        email: "jane@example.com".to_string(),
        name: "Jane Doe".to_string(),
        picture: "https://idp.test/jane.png".to_string(),
        provider: "oidc".to_string(),
    }
}

pub(crate) fn fixture_customer() -> Customer {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Customer {
        id: customer_id(),
        email: "jane@example.com".to_string(),
        name: "Jane Doe".to_string(),
        phone: "0712345678".to_string(),
        created_at,
        updated_at: created_at,
    }
}

pub(crate) fn fixture_category() -> Category {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Category {
        id: category_id(),
        name: "Electronics".to_string(),
        description: String::new(),
        parent_id: None,
        level: 0,
        path: "/Electronics".to_string(),
        created_at,
        updated_at: created_at,
    }
}

pub(crate) fn fixture_product<F>(mut func: F) -> Product
where
    F: FnMut(&mut Product),
{
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut product = Product {
        id: product_id(),
        name: "Widget".to_string(),
        description: String::new(),
        price: 10.5,
        category_id: category_id(),
        stock: 5,
        image_url: String::new(),
        created_at,
        updated_at: created_at,
        category: fixture_category(),
    };
    func(&mut product);
    product
}

pub(crate) fn fixture_order() -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    Order {
        id: order_id(),
        customer_id: customer_id(),
        status: OrderStatus::Pending,
        total: 21.0,
        created_at,
        updated_at: created_at,
        customer: fixture_customer(),
        items: vec![OrderItem {
            id: Uuid::from_u128(0x32),
            order_id: order_id(),
            product_id: product_id(),
            quantity: 2,
            price: 10.5,
            product: fixture_product(|_| {}),
        }],
    }
}

/// A store with one customer, one category and one product.
pub(crate) fn fixture_db() -> InMemoryDBClient {
    InMemoryDBClient::default()
        .with_customer(fixture_customer())
        .with_category(fixture_category())
        .with_product(fixture_product(|_| {}))
}

pub(crate) async fn body_json(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub(crate) async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub(crate) fn set_cookies(resp: &Response) -> Vec<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Value of the cookie `name` set by the response.
pub(crate) fn cookie_value(resp: &Response, name: &str) -> Option<String> {
    set_cookies(resp).into_iter().find_map(|cookie| {
        let (pair, _) = cookie.split_once(';')?;
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
