use axum::body::Body;
use http::{
    Method, Request, StatusCode,
    header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, COOKIE, LOCATION},
};
use oauth::mock::MOCK_AUTHORIZATION_ENDPOINT;
use rstest::rstest;
use serde_json::{Value, json};
use shop::test_utils::InMemoryDBClient;

use crate::utils::{
    TestApp, body_json, body_text, cookie_value, customer_id, fixture_app, fixture_claims,
    fixture_db, fixture_order, fixture_product, fixture_profile, fixture_token_set, order_id,
    product_id, set_cookies, user_id,
};

mod utils;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authorized_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn callback(query: &str, state_cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(format!("/api/auth/callback?{query}"));
    if let Some(state) = state_cookie {
        builder = builder.header(COOKIE, format!("oidc_state={state}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Runs the login redirect and returns the state stored in the cookie.
async fn login(app: &TestApp) -> String {
    let resp = app.send(get("/api/auth/login")).await;
    cookie_value(&resp, "oidc_state").expect("state cookie")
}

#[tokio::test]
async fn test_health() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});

    // when
    let resp = app.send(get("/health")).await;

    // then
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "status": "ok" }));
}

#[rstest]
#[case::without_pkce(false)]
#[case::with_pkce(true)]
#[tokio::test]
async fn test_login_redirects_to_provider(#[case] use_pkce: bool) {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |c| c.use_pkce = use_pkce);

    // when
    let resp = app.send(get("/api/auth/login")).await;

    // then
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = resp.headers()[LOCATION].to_str().unwrap().to_string();
    assert!(location.starts_with(MOCK_AUTHORIZATION_ENDPOINT));

    let state = cookie_value(&resp, "oidc_state").unwrap();
    assert!(location.contains(&format!("state={state}")));
    assert_eq!(cookie_value(&resp, "oidc_pkce_verifier").is_some(), use_pkce);
    assert_eq!(location.contains("code_challenge="), use_pkce);
}

#[tokio::test]
async fn test_login_then_callback_issues_session_token() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});
    *app.provider.exchange_code_resp.lock().await = Some(Ok(fixture_token_set()));
    *app.provider.verify_id_token_resp.lock().await = Some(Ok(fixture_claims()));
    *app.provider.fetch_profile_resp.lock().await = Some(Ok(fixture_profile()));
    let state = login(&app).await;

    // when
    let resp = app
        .send(callback(&format!("code=auth-code&state={state}"), Some(state.as_str())))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        set_cookies(&resp),
        vec![
            "oidc_state=; Max-Age=0; Path=/; Secure; HttpOnly; SameSite=Lax",
            "oidc_pkce_verifier=; Max-Age=0; Path=/; Secure; HttpOnly; SameSite=Lax",
        ]
    );
    let body = body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 86400);
    assert_eq!(body["user"]["email"], "jane@example.com");

    // and the token authenticates the caller
    let token = body["access_token"].as_str().unwrap();
    let resp = app.send(authorized_get("/api/auth/userinfo", token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({
            "user_id": user_id(),
            "email": "jane@example.com",
            "auth_type": "jwt",
        })
    );
}

#[rstest]
#[case::state_mismatch("code=auth-code&state=forged", Some("expected"), "Invalid state parameter")]
#[case::missing_state_cookie("code=auth-code&state=expected", None, "Invalid state parameter")]
#[case::provider_error("error=access_denied", Some("expected"), "OIDC error: access_denied")]
#[tokio::test]
async fn test_callback_rejected(
    #[case] query: &str,
    #[case] state_cookie: Option<&str>,
    #[case] want_body: &str,
) {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});

    // when
    let resp = app.send(callback(query, state_cookie)).await;

    // then
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(set_cookies(&resp).len(), 2);
    assert_eq!(body_text(resp).await, want_body);
    assert_eq!(*app.provider.exchange_code_count.lock().await, 0);
}

#[tokio::test]
async fn test_userinfo_with_provider_id_token() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});
    *app.provider.verify_id_token_resp.lock().await = Some(Ok(fixture_claims()));

    // when
    let resp = app
        .send(authorized_get("/api/auth/userinfo", "provider-id-token"))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["auth_type"], "oidc");
}

#[tokio::test]
async fn test_protected_route_requires_credential() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});
    let body = json!({ "name": "Jane Doe", "email": "jane@example.com", "phone": "0712345678" });

    // when
    let resp = app
        .send(json_request(Method::POST, "/api/customers", body, None))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "authorization header required");
}

#[tokio::test]
async fn test_protected_route_rejects_unknown_token() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});
    *app.provider.verify_id_token_resp.lock().await = Some(Err(oauth::Error::NoMatchingJwk));

    // when
    let resp = app
        .send(authorized_get(&format!("/api/customers/{}", customer_id()), "garbage"))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "invalid token");
}

#[tokio::test]
async fn test_create_customer_returns_usable_token() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});
    let token = app.session_token(user_id(), "admin@example.com");
    let body = json!({ "name": "Jane Doe", "email": "jane@example.com", "phone": "0712345678" });

    // when
    let resp = app
        .send(json_request(Method::POST, "/api/customers", body, Some(&token)))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["customer"]["email"], "jane@example.com");

    let id = body["customer"]["id"].as_str().unwrap();
    let customer_token = body["token"].as_str().unwrap();
    let resp = app
        .send(authorized_get(&format!("/api/customers/{id}"), customer_token))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["name"], "Jane Doe");
}

#[tokio::test]
async fn test_create_customer_duplicate_email() {
    // given
    let app = fixture_app(fixture_db(), |_| {});
    let token = app.session_token(user_id(), "admin@example.com");
    let body = json!({ "name": "Jane Again", "email": "jane@example.com", "phone": "0712345678" });

    // when
    let resp = app
        .send(json_request(Method::POST, "/api/customers", body, Some(&token)))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_order_insufficient_stock() {
    // given
    let db = fixture_db().with_product(fixture_product(|p| p.stock = 1));
    let app = fixture_app(db, |_| {});
    let body = json!({
        "customer_id": customer_id(),
        "items": [{ "product_id": product_id(), "quantity": 2 }],
    });

    // when
    let resp = app
        .send(json_request(Method::POST, "/api/orders", body, None))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({ "error": "Insufficient stock for product: Widget" })
    );
    assert_eq!(app.db.stock(product_id()), Some(1));
    assert_eq!(app.db.order_count(), 0);
}

#[tokio::test]
async fn test_create_order() {
    // given
    let app = fixture_app(fixture_db(), |_| {});
    let body = json!({
        "customer_id": customer_id(),
        "items": [{ "product_id": product_id(), "quantity": 2 }],
    });

    // when
    let resp = app
        .send(json_request(Method::POST, "/api/orders", body, None))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["total"], 21.0);
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(app.db.stock(product_id()), Some(3));
}

#[rstest]
#[case::shipped("shipped", StatusCode::OK, "shipped")]
#[case::unknown_status("lost", StatusCode::BAD_REQUEST, "pending")]
#[tokio::test]
async fn test_update_order_status(
    #[case] status: &str,
    #[case] want_status: StatusCode,
    #[case] want_order_status: &str,
) {
    // given
    let app = fixture_app(fixture_db().with_order(fixture_order()), |_| {});
    let uri = format!("/api/orders/{}/status", order_id());

    // when
    let resp = app
        .send(json_request(Method::PUT, &uri, json!({ "status": status }), None))
        .await;

    // then
    assert_eq!(resp.status(), want_status);
    let resp = app.send(get(&format!("/api/orders/{}", order_id()))).await;
    assert_eq!(body_json(resp).await["status"], want_order_status);
}

#[rstest]
#[case::invalid_id("/api/products/not-a-uuid", StatusCode::BAD_REQUEST)]
#[case::unknown_product("/api/products/00000000-0000-0000-0000-000000000404", StatusCode::NOT_FOUND)]
#[case::unknown_category_average(
    "/api/products/category/00000000-0000-0000-0000-000000000404/average-price",
    StatusCode::NOT_FOUND
)]
#[case::product("/api/products/00000000-0000-0000-0000-000000000022", StatusCode::OK)]
#[tokio::test]
async fn test_get_product(#[case] uri: &str, #[case] want: StatusCode) {
    // given
    let app = fixture_app(fixture_db(), |_| {});

    // when
    let resp = app.send(get(uri)).await;

    // then
    assert_eq!(resp.status(), want);
}

#[tokio::test]
async fn test_invalid_body() {
    // given
    let app = fixture_app(fixture_db(), |_| {});

    // when
    let resp = app
        .send(json_request(Method::POST, "/api/products", json!({ "name": 1 }), None))
        .await;

    // then
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn test_logout_with_session_token() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});
    let token = app.session_token(user_id(), "jane@example.com");
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    // when
    let resp = app.send(req).await;

    // then
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[CACHE_CONTROL],
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(set_cookies(&resp).len(), 5);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Successfully logged out");
    assert_eq!(body["instructions"]["client_action"], "clear_token");
    assert!(body.get("oidc_logout_url").is_none());
}

#[tokio::test]
async fn test_logout_with_provider_id_token() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |c| {
        c.provider.provider_url = "https://accounts.google.com".to_string()
    });
    *app.provider.verify_id_token_resp.lock().await = Some(Ok(fixture_claims()));
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .header(AUTHORIZATION, "Bearer provider-id-token")
        .body(Body::empty())
        .unwrap();

    // when
    let resp = app.send(req).await;

    // then
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["oidc_logout_url"], "https://accounts.google.com/logout");
    assert!(body["instructions"]["oidc_logout"].is_string());
}

#[tokio::test]
async fn test_logout_without_credential() {
    // given
    let app = fixture_app(InMemoryDBClient::default(), |_| {});
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap();

    // when
    let resp = app.send(req).await;

    // then
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await.get("oidc_logout_url").is_none());
}
