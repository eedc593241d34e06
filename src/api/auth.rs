//! Authentication endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{rep::LoginRequest, RepProfile},
    AppState,
};

use super::AuthenticatedRep;

/// Login response carrying the session token and the resolved profile
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub name: String,
    /// "All" or a comma-joined area-code list
    pub area_code: String,
}

/// Authenticate with a rep PIN
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid PIN")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (profile, token) = state.services.auth.authenticate(&request.pin).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        name: profile.name,
        area_code: profile.area_code,
    }))
}

/// Get the authenticated rep's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current profile", body = RepProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedRep(claims): AuthenticatedRep) -> Json<RepProfile> {
    Json(claims.profile())
}
