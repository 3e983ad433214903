use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    models::{CreateFabricRequest, FabricInput, FabricListQuery, FabricUpdate},
};

const DEFAULT_COLOR_HEX: &str = "#808080";

pub async fn list_fabrics(
    State(state): State<AppState>,
    Query(query): Query<FabricListQuery>,
) -> Result<Json<serde_json::Value>> {
    let fabrics = match query.category {
        Some(category) => state.fabrics.get_fabrics_by_category(category).await?,
        None => state.fabrics.get_active_fabrics().await?,
    };

    Ok(Json(json!({ "fabrics": fabrics })))
}

pub async fn create_fabric(
    State(state): State<AppState>,
    Json(request): Json<CreateFabricRequest>,
) -> Result<Json<serde_json::Value>> {
    let (Some(name), Some(category), Some(description), Some(image_url), Some(thumbnail_url)) = (
        non_blank(request.name),
        request.category,
        non_blank(request.description),
        non_blank(request.image_url),
        non_blank(request.thumbnail_url),
    ) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let input = FabricInput {
        name,
        category,
        description,
        color_hex: non_blank(request.color_hex).unwrap_or_else(|| DEFAULT_COLOR_HEX.to_string()),
        tags: request
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        is_active: Some(request.is_active.unwrap_or(true)),
        sort_order: request.sort_order,
    };

    let fabric = state
        .fabrics
        .create_fabric(input, image_url, thumbnail_url)
        .await?;
    state.metrics.record_fabric_operation("create");

    Ok(Json(json!({ "success": true, "fabric": fabric })))
}

pub async fn get_fabric(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let fabric = state
        .fabrics
        .get_fabric(fabric_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(json!({ "fabric": fabric })))
}

pub async fn update_fabric(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<FabricUpdate>,
) -> Result<Json<serde_json::Value>> {
    let fabric = state
        .fabrics
        .update_fabric(fabric_id(&id)?, updates)
        .await?
        .ok_or(AppError::NotFound)?;
    state.metrics.record_fabric_operation("update");

    Ok(Json(json!({ "success": true, "fabric": fabric })))
}

pub async fn delete_fabric(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if !state.fabrics.delete_fabric(fabric_id(&id)?).await? {
        return Err(AppError::NotFound);
    }
    state.metrics.record_fabric_operation("delete");

    Ok(Json(json!({ "success": true })))
}

pub async fn toggle_fabric(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let fabric = state
        .fabrics
        .toggle_fabric_active(fabric_id(&id)?)
        .await?
        .ok_or(AppError::NotFound)?;
    state.metrics.record_fabric_operation("toggle");

    Ok(Json(json!({ "success": true, "fabric": fabric })))
}

pub async fn reconcile_indexes(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let report = state.fabrics.reconcile_indexes().await?;
    state.metrics.record_fabric_operation("reconcile");

    Ok(Json(json!({ "success": true, "report": report })))
}

/// Ids are minted as UUIDs, so anything else cannot name a stored fabric.
fn fabric_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
