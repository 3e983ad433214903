use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    middleware::Visitor,
    models::{GalleryResponse, RemoveImageRequest, SaveImageRequest, SaveImageResponse},
    services::MAX_GALLERY_SIZE,
};

pub async fn get_gallery(State(state): State<AppState>, visitor: Visitor) -> Result<Response> {
    // A freshly minted id cannot own anything yet.
    let images = if visitor.is_new {
        Vec::new()
    } else {
        state.gallery.get_gallery(&visitor.id).await?.images
    };

    let body = GalleryResponse {
        count: images.len(),
        images,
        max_allowed: MAX_GALLERY_SIZE,
    };
    Ok(visitor.attach_cookie(Json(body).into_response(), state.config.cookie_secure))
}

pub async fn save_to_gallery(
    State(state): State<AppState>,
    visitor: Visitor,
    Json(request): Json<SaveImageRequest>,
) -> Result<Response> {
    if !request.is_complete() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let result = state.gallery.add_to_gallery(&visitor.id, request).await?;
    let saved = result.is_saved();
    state
        .metrics
        .record_gallery_operation("save", if saved { "saved" } else { "gallery_full" });

    let status = if saved {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    let response = (status, Json(SaveImageResponse::from(result))).into_response();
    Ok(visitor.attach_cookie(response, state.config.cookie_secure))
}

pub async fn delete_from_gallery(
    State(state): State<AppState>,
    visitor: Visitor,
    request: Option<Json<RemoveImageRequest>>,
) -> Result<Response> {
    if visitor.is_new {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No gallery found" })),
        )
            .into_response());
    }

    let image_id = request
        .and_then(|Json(request)| request.image_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Missing imageId".to_string()))?;

    let result = state
        .gallery
        .remove_from_gallery(&visitor.id, &image_id)
        .await?;
    state.metrics.record_gallery_operation("remove", "removed");

    Ok(Json(result).into_response())
}
