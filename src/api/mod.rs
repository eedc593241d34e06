//! API handlers for FieldLog REST endpoints

pub mod auth;
pub mod health;
pub mod openapi;
pub mod photos;
pub mod stats;
pub mod visits;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{error::AppError, models::RepClaims, AppState};

/// Extractor for the authenticated rep from the session bearer token
pub struct AuthenticatedRep(pub RepClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedRep {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Authentication("Missing or invalid authorization header".to_string())
                })?;

        let claims = RepClaims::from_token(bearer.token(), &state.config.auth.session_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedRep(claims))
    }
}
