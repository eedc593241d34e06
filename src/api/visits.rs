//! Visit record endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        visit::{AreaCodePatch, VisitPayload},
        Visit,
    },
    AppState,
};

use super::AuthenticatedRep;

/// Envelope for the store-only fetch: read paths never fail outright, the
/// flag marks total store unreachability
#[derive(Serialize, ToSchema)]
pub struct CloudVisitsResponse {
    pub success: bool,
    pub data: Vec<Visit>,
}

/// Response for a newly submitted visit
#[derive(Serialize, ToSchema)]
pub struct CreateVisitResponse {
    pub success: bool,
    /// Whether the record reached the remote store
    pub synced: bool,
    /// Display-ready outcome message
    pub message: String,
    pub visit: Visit,
}

/// List visits: the remote store reconciled with the offline cache
#[utoipa::path(
    get,
    path = "/visits",
    tag = "visits",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reconciled visit list", body = [Visit])
    )
)]
pub async fn list_visits(
    State(state): State<AppState>,
    AuthenticatedRep(_claims): AuthenticatedRep,
) -> Json<Vec<Visit>> {
    Json(state.services.visits.merged_visits().await)
}

/// List visits from the remote store only
#[utoipa::path(
    get,
    path = "/visits/cloud",
    tag = "visits",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Store visits with success flag", body = CloudVisitsResponse)
    )
)]
pub async fn cloud_visits(
    State(state): State<AppState>,
    AuthenticatedRep(_claims): AuthenticatedRep,
) -> Json<CloudVisitsResponse> {
    match state.services.visits.cloud_visits().await {
        Ok(data) => Json(CloudVisitsResponse { success: true, data }),
        Err(e) => {
            tracing::warn!("Cloud fetch failed: {}", e);
            Json(CloudVisitsResponse {
                success: false,
                data: Vec::new(),
            })
        }
    }
}

/// List locally cached visits (recent activity view)
#[utoipa::path(
    get,
    path = "/visits/local",
    tag = "visits",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cached visit list", body = [Visit])
    )
)]
pub async fn local_visits(
    State(state): State<AppState>,
    AuthenticatedRep(_claims): AuthenticatedRep,
) -> Json<Vec<Visit>> {
    Json(state.services.visits.local_visits().await)
}

/// Record a new visit
#[utoipa::path(
    post,
    path = "/visits",
    tag = "visits",
    security(("bearer_auth" = [])),
    request_body = VisitPayload,
    responses(
        (status = 201, description = "Visit recorded", body = CreateVisitResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_visit(
    State(state): State<AppState>,
    AuthenticatedRep(claims): AuthenticatedRep,
    Json(payload): Json<VisitPayload>,
) -> AppResult<(StatusCode, Json<CreateVisitResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let now = Utc::now();
    let mut visit = payload.into_visit(Uuid::new_v4().to_string(), now);
    if visit.user.is_none() {
        visit.user = Some(claims.sub.clone());
    }

    // Inline photos go to the blob store first; on failure the record is
    // submitted anyway and the store copy carries the failure sentinel
    if let Some(data_url) = visit
        .photo_url
        .clone()
        .filter(|url| url.starts_with("data:"))
    {
        let filename = format!("visit-{}-{}.jpg", visit.id, now.timestamp_millis());
        match state.services.photos.upload(&data_url, &filename).await {
            Ok(url) => visit.photo_url = Some(url),
            Err(AppError::NotConfigured(reason)) => {
                tracing::debug!("Photo store not configured ({}); keeping inline photo", reason);
            }
            Err(e) => {
                tracing::warn!("Photo upload failed: {}", e);
            }
        }
    }

    let outcome = state.services.visits.submit(visit).await;
    Ok((
        StatusCode::CREATED,
        Json(CreateVisitResponse {
            success: true,
            synced: outcome.synced,
            message: outcome.message,
            visit: outcome.visit,
        }),
    ))
}

/// Get a single visit by ID
#[utoipa::path(
    get,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visit", body = Visit),
        (status = 404, description = "Visit not found")
    )
)]
pub async fn get_visit(
    State(state): State<AppState>,
    AuthenticatedRep(_claims): AuthenticatedRep,
    Path(id): Path<String>,
) -> AppResult<Json<Visit>> {
    Ok(Json(state.services.visits.get(&id).await?))
}

/// Replace an existing visit in full
#[utoipa::path(
    put,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Visit ID")),
    request_body = VisitPayload,
    responses(
        (status = 200, description = "Updated visit", body = Visit),
        (status = 404, description = "Visit not found")
    )
)]
pub async fn update_visit(
    State(state): State<AppState>,
    AuthenticatedRep(_claims): AuthenticatedRep,
    Path(id): Path<String>,
    Json(payload): Json<VisitPayload>,
) -> AppResult<Json<Visit>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let visit = payload.into_visit(id, Utc::now());
    Ok(Json(state.services.visits.update(visit).await?))
}

/// Delete a visit
#[utoipa::path(
    delete,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Visit ID")),
    responses(
        (status = 204, description = "Visit deleted"),
        (status = 404, description = "Visit not found")
    )
)]
pub async fn delete_visit(
    State(state): State<AppState>,
    AuthenticatedRep(_claims): AuthenticatedRep,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.visits.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Patch only the area code of a visit
#[utoipa::path(
    patch,
    path = "/visits/{id}/area-code",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Visit ID")),
    request_body = AreaCodePatch,
    responses(
        (status = 204, description = "Area code updated"),
        (status = 404, description = "Visit not found")
    )
)]
pub async fn patch_area_code(
    State(state): State<AppState>,
    AuthenticatedRep(_claims): AuthenticatedRep,
    Path(id): Path<String>,
    Json(patch): Json<AreaCodePatch>,
) -> AppResult<StatusCode> {
    patch
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .visits
        .patch_area_code(&id, &patch.area_code)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
