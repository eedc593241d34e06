//! Customer statistics endpoints

use axum::{extract::Query, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    analysis::OverdueReport,
    models::PharmacyStats,
    AppState,
};

use super::AuthenticatedRep;

/// Query parameters for customer statistics
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CustomerStatsQuery {
    /// Restrict rollups to visits made by this user
    pub user: Option<String>,
}

/// Customer statistics response
#[derive(Serialize, ToSchema)]
pub struct CustomerStatsResponse {
    /// False only when the store could not be reached at all
    pub success: bool,
    pub stats: Vec<PharmacyStats>,
    /// Distinct user names visible to the requester, for filter suggestions
    pub users: Vec<String>,
}

/// Overdue classification response
#[derive(Serialize, ToSchema)]
pub struct OverdueResponse {
    pub success: bool,
    pub report: OverdueReport,
}

/// Get per-pharmacy rollups scoped to the rep's area codes
#[utoipa::path(
    get,
    path = "/customers/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(CustomerStatsQuery),
    responses(
        (status = 200, description = "Per-pharmacy statistics", body = CustomerStatsResponse)
    )
)]
pub async fn get_customer_stats(
    State(state): State<AppState>,
    AuthenticatedRep(claims): AuthenticatedRep,
    Query(query): Query<CustomerStatsQuery>,
) -> Json<CustomerStatsResponse> {
    let filter_user = query.user.as_deref().filter(|u| !u.is_empty());

    match state
        .services
        .stats
        .customer_stats(&claims.area_code, filter_user)
        .await
    {
        Ok(result) => Json(CustomerStatsResponse {
            success: true,
            stats: result.stats,
            users: result.users,
        }),
        Err(e) => {
            tracing::error!("Stats aggregation error: {}", e);
            Json(CustomerStatsResponse {
                success: false,
                stats: Vec::new(),
                users: Vec::new(),
            })
        }
    }
}

/// Get overdue-visit buckets scoped to the rep's area codes
#[utoipa::path(
    get,
    path = "/customers/overdue",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue buckets grouped by area", body = OverdueResponse)
    )
)]
pub async fn get_overdue(
    State(state): State<AppState>,
    AuthenticatedRep(claims): AuthenticatedRep,
) -> Json<OverdueResponse> {
    match state
        .services
        .stats
        .overdue_report(&claims.area_code, Utc::now())
        .await
    {
        Ok(report) => Json(OverdueResponse {
            success: true,
            report,
        }),
        Err(e) => {
            tracing::error!("Overdue classification error: {}", e);
            Json(OverdueResponse {
                success: false,
                report: OverdueReport::default(),
            })
        }
    }
}
