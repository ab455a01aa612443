use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use common::{Now as _, SystemNow};
use oauth::IdentityProvider;
use serde::{Deserialize, Serialize};
use setup::parse_id;
use shop::{
    Category, CategoryPrice, CreateCategoryReq, CreateCustomerReq, CreateOrderReq,
    CreateProductReq, Customer, DBClient, Order, Product,
};
use tracing::instrument;

use crate::{AppState, error::ApiError};

type Created<T> = (StatusCode, Json<T>);

#[derive(Debug, Serialize)]
pub struct CreateCustomerResp {
    pub customer: Customer,
    /// Session token for the new customer.
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusReq {
    pub status: String,
}

/// Registers a customer and issues a session token for them.
#[instrument(skip_all, err)]
pub async fn create_customer<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    payload: Result<Json<CreateCustomerReq>, JsonRejection>,
) -> Result<Created<CreateCustomerResp>, ApiError> {
    let Json(req) = payload?;
    let customer = state.shop.create_customer(req).await?;

    let token = state
        .auth
        .tokens
        .issue(customer.id, &customer.email, SystemNow::now())
        .map_err(auth::Error::IssueToken)?;

    Ok((StatusCode::CREATED, Json(CreateCustomerResp { customer, token })))
}

#[instrument(skip(state), fields(id), err)]
pub async fn get_customer<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let id = parse_id(&id, "customer")?;
    Ok(Json(state.shop.get_customer(id).await?))
}

#[instrument(skip(state), fields(id), err)]
pub async fn list_customer_orders<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let id = parse_id(&id, "customer")?;
    Ok(Json(state.shop.list_customer_orders(id).await?))
}

#[instrument(skip_all, err)]
pub async fn create_category<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    payload: Result<Json<CreateCategoryReq>, JsonRejection>,
) -> Result<Created<Category>, ApiError> {
    let Json(req) = payload?;
    let category = state.shop.create_category(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip_all, err)]
pub async fn list_categories<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.shop.list_categories().await?))
}

#[instrument(skip(state), fields(id), err)]
pub async fn get_category<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let id = parse_id(&id, "category")?;
    Ok(Json(state.shop.get_category(id).await?))
}

#[instrument(skip(state), fields(id), err)]
pub async fn list_child_categories<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let id = parse_id(&id, "category")?;
    Ok(Json(state.shop.list_child_categories(id).await?))
}

#[instrument(skip_all, err)]
pub async fn create_product<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    payload: Result<Json<CreateProductReq>, JsonRejection>,
) -> Result<Created<Product>, ApiError> {
    let Json(req) = payload?;
    let product = state.shop.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip_all, err)]
pub async fn list_products<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.shop.list_products().await?))
}

#[instrument(skip(state), fields(id), err)]
pub async fn get_product<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id, "product")?;
    Ok(Json(state.shop.get_product(id).await?))
}

#[instrument(skip(state), fields(id), err)]
pub async fn list_products_by_category<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let id = parse_id(&id, "category")?;
    Ok(Json(state.shop.list_products_by_category(id).await?))
}

#[instrument(skip(state), fields(id), err)]
pub async fn average_price_by_category<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
) -> Result<Json<CategoryPrice>, ApiError> {
    let id = parse_id(&id, "category")?;
    Ok(Json(state.shop.average_price_by_category(id).await?))
}

/// Places an order. Responds with the stored order including line items.
#[instrument(skip_all, err)]
pub async fn create_order<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    payload: Result<Json<CreateOrderReq>, JsonRejection>,
) -> Result<Created<Order>, ApiError> {
    let Json(req) = payload?;
    let order = state.shop.create_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[instrument(skip(state), fields(id), err)]
pub async fn get_order<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = parse_id(&id, "order")?;
    Ok(Json(state.shop.get_order(id).await?))
}

#[instrument(skip(state, payload), fields(id), err)]
pub async fn update_order_status<P: IdentityProvider, D: DBClient>(
    State(state): State<AppState<P, D>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateOrderStatusReq>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let id = parse_id(&id, "order")?;
    let Json(req) = payload?;
    Ok(Json(state.shop.update_order_status(id, &req.status).await?))
}
