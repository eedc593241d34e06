//! Photo upload endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

use super::AuthenticatedRep;

/// Photo upload request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PhotoUploadRequest {
    /// base64 data URL of the image
    #[validate(length(min = 1, message = "Image data is required"))]
    pub data: String,
    #[validate(length(min = 1, message = "Filename is required"))]
    pub filename: String,
}

/// Photo upload response
#[derive(Serialize, ToSchema)]
pub struct PhotoUploadResponse {
    pub success: bool,
    pub url: String,
}

/// Upload a visit photo to the blob store
#[utoipa::path(
    post,
    path = "/photos",
    tag = "photos",
    security(("bearer_auth" = [])),
    request_body = PhotoUploadRequest,
    responses(
        (status = 200, description = "Photo uploaded", body = PhotoUploadResponse),
        (status = 400, description = "Invalid image payload"),
        (status = 503, description = "Blob store not configured")
    )
)]
pub async fn upload_photo(
    State(state): State<AppState>,
    AuthenticatedRep(_claims): AuthenticatedRep,
    Json(request): Json<PhotoUploadRequest>,
) -> AppResult<Json<PhotoUploadResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let url = state
        .services
        .photos
        .upload(&request.data, &request.filename)
        .await?;

    Ok(Json(PhotoUploadResponse { success: true, url }))
}
