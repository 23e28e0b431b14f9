//! Route handlers. Store calls are synchronous SQLite work and run on the
//! blocking pool.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use stockpilot_core::{
    dashboard, inventory_report, Dashboard, Inventory, InventoryReport, InventoryResult, MediaUrl,
    Product, ProductDraft, ProductId, ProductPatch, ProductQuery, RestockReceipt,
    SqliteProductStore, KNOWN_CATEGORIES,
};
use stockpilot_media::{MediaError, UploadCredentials};
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

async fn blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Inventory<SqliteProductStore>) -> InventoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let inventory = state.inventory.clone();
    tokio::task::spawn_blocking(move || f(&inventory))
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
}

fn parse_id(raw: &str) -> ApiResult<ProductId> {
    Ok(ProductId::parse(raw)?)
}

/// Swap inline media for uploaded copies when offloading is on.
async fn offload_media(state: &AppState, media: Vec<MediaUrl>) -> ApiResult<Vec<MediaUrl>> {
    if !state.config.offload_inline_media || !media.iter().any(MediaUrl::is_inline) {
        return Ok(media);
    }
    if !state.media.is_configured() {
        debug!("inline media kept; object storage not configured");
        return Ok(media);
    }
    Ok(state.media.offload_all(&media).await?)
}

pub(crate) async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn version() -> impl IntoResponse {
    Json(json!({
        "name": "stockpilot",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn categories() -> impl IntoResponse {
    Json(KNOWN_CATEGORIES)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    order: Option<String>,
}

impl ListParams {
    fn into_query(self) -> ApiResult<ProductQuery> {
        let mut query = ProductQuery {
            search: self.q,
            ..Default::default()
        };
        if let Some(sort) = self.sort.as_deref() {
            query.sort = sort.parse()?;
        }
        if let Some(order) = self.order.as_deref() {
            query.order = order.parse()?;
        }
        Ok(query)
    }
}

pub(crate) async fn list_products(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Product>>> {
    let Query(params) = params?;
    let query = params.into_query()?;
    let products = blocking(&state, move |inv| inv.products(&query)).await?;
    Ok(Json(products))
}

pub(crate) async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(mut draft) = payload?;
    draft.check()?;
    draft.media_urls = offload_media(&state, draft.media_urls).await?;
    let product = blocking(&state, move |inv| inv.add(draft)).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub(crate) async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Product>> {
    let id = parse_id(&raw_id)?;
    let product = blocking(&state, move |inv| inv.get(&id)).await?;
    Ok(Json(product))
}

pub(crate) async fn update_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let id = parse_id(&raw_id)?;
    let Json(mut patch) = payload?;
    patch.check()?;
    if let Some(media) = patch.media_urls.take() {
        patch.media_urls = Some(offload_media(&state, media).await?);
    }
    let product = blocking(&state, move |inv| inv.update(&id, patch)).await?;
    Ok(Json(product))
}

pub(crate) async fn delete_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    blocking(&state, move |inv| inv.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetStockRequest {
    stock_level: u32,
}

pub(crate) async fn set_stock(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<SetStockRequest>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let id = parse_id(&raw_id)?;
    let Json(req) = payload?;
    let product = blocking(&state, move |inv| {
        inv.set_stock(&id, req.stock_level)?;
        inv.get(&id)
    })
    .await?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestockRequest {
    quantity: i64,
}

pub(crate) async fn restock(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<RestockRequest>, JsonRejection>,
) -> ApiResult<Json<RestockReceipt>> {
    let id = parse_id(&raw_id)?;
    let Json(req) = payload?;
    let receipt = blocking(&state, move |inv| inv.restock(&id, req.quantity)).await?;
    Ok(Json(receipt))
}

pub(crate) async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(blocking(&state, |inv| inv.low_stock()).await?))
}

pub(crate) async fn dashboard_snapshot(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    let products = blocking(&state, |inv| inv.all()).await?;
    Ok(Json(dashboard(&products)))
}

pub(crate) async fn category_report(
    State(state): State<AppState>,
) -> ApiResult<Json<InventoryReport>> {
    let products = blocking(&state, |inv| inv.all()).await?;
    Ok(Json(inventory_report(&products)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadCredentialsRequest {
    file_name: String,
}

pub(crate) async fn upload_credentials(
    State(state): State<AppState>,
    payload: Result<Json<UploadCredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<UploadCredentials>> {
    if !state.media.is_configured() {
        return Err(MediaError::Config {
            message: "object storage credentials and bucket are not set".to_string(),
        }
        .into());
    }
    let Json(req) = payload?;
    let credentials = state.media.upload_credentials(&req.file_name).await?;
    debug!(file_name = %credentials.final_file_name, "issued upload credentials");
    Ok(Json(credentials))
}
