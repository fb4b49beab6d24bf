//! # REST Surface
//!
//! The catalog is mounted under `/products` and the warehouse under `/warehouse`.
//! Handlers only parse input, call the service, and map [`InventoryError`] to a
//! status code; all behavior lives in the services.

use crate::catalog::{CatalogService, NewProduct, ProductDetails, ProductPage, DEFAULT_PAGE_SIZE};
use crate::error::InventoryError;
use crate::lifecycle::InventorySystem;
use crate::model::{Product, ProductId, ProductQuery};
use crate::warehouse::StockService;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub stock: StockService,
}

impl AppState {
    pub fn from_system(system: &InventorySystem) -> Self {
        Self {
            catalog: system.catalog.clone(),
            stock: system.stock.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecreaseRequest {
    /// Whole numbers are accepted in either JSON form, so `2` and `2.0` both mean 2.
    #[serde(deserialize_with = "whole_number")]
    pub value: i64,
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(D::Error::custom(format!("expected an integer, got {}", number))),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountParams {
    /// Count only products with stock on hand.
    #[serde(default)]
    pub in_stock: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BuyResponse {
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/instock", get(list_in_stock))
        .route("/products/count", get(count_products))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(remove_product),
        )
        .route("/products/:id/buy", post(buy_product))
        .route("/warehouse/product/:id/count", get(product_count))
        .route(
            "/warehouse/product/:id/quantity/decrease",
            put(decrease_quantity),
        )
        .with_state(state)
}

impl InventoryError {
    pub fn status(&self) -> StatusCode {
        match self {
            InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
            InventoryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            InventoryError::InsufficientStock { .. } => StatusCode::CONFLICT,
            InventoryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            InventoryError::CallTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            InventoryError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            InventoryError::NotFound(_) => "not_found",
            InventoryError::InvalidArgument(_) => "invalid_argument",
            InventoryError::InsufficientStock { .. } => "insufficient_stock",
            InventoryError::StoreUnavailable(_) => "store_unavailable",
            InventoryError::CallTimeout { .. } => "call_timeout",
            InventoryError::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for InventoryError {
    fn from(rejection: JsonRejection) -> Self {
        InventoryError::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for InventoryError {
    fn from(rejection: QueryRejection) -> Self {
        InventoryError::InvalidArgument(rejection.body_text())
    }
}

fn parse_id(raw: &str) -> Result<ProductId, InventoryError> {
    Ok(raw.parse::<ProductId>()?)
}

async fn list_products(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ProductPage>, InventoryError> {
    let Query(params) = params?;
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    Ok(Json(state.catalog.list(page, page_size).await?))
}

async fn count_products(
    State(state): State<AppState>,
    params: Result<Query<CountParams>, QueryRejection>,
) -> Result<Json<CountResponse>, InventoryError> {
    let Query(params) = params?;
    let query = if params.in_stock {
        ProductQuery::InStock
    } else {
        ProductQuery::All
    };
    let count = state.catalog.count(query).await?;
    Ok(Json(CountResponse { count }))
}

async fn list_in_stock(State(state): State<AppState>) -> Result<Json<Vec<Product>>, InventoryError> {
    Ok(Json(state.catalog.list_in_stock().await?))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, InventoryError> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.get(id).await?))
}

async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), InventoryError> {
    let Json(new) = body?;
    let product = state.catalog.create(new).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ProductDetails>, JsonRejection>,
) -> Result<Json<Product>, InventoryError> {
    let id = parse_id(&id)?;
    let Json(details) = body?;
    Ok(Json(state.catalog.update(id, details).await?))
}

async fn remove_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, InventoryError> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.remove(id).await?))
}

async fn buy_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BuyResponse>, InventoryError> {
    let id = parse_id(&id)?;
    let message = state.catalog.buy(id).await?;
    Ok(Json(BuyResponse { message }))
}

async fn product_count(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, InventoryError> {
    let id = parse_id(&id)?;
    Ok(Json(state.stock.count(id).await?))
}

async fn decrease_quantity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<DecreaseRequest>, JsonRejection>,
) -> Result<Json<Product>, InventoryError> {
    let id = parse_id(&id)?;
    let Json(request) = body?;
    Ok(Json(state.stock.decrease(id, request.value).await?))
}
