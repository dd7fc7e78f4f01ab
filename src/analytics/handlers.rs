// HTTP handlers for the analytics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::analytics::error::AnalyticsError;
use crate::analytics::models::{ConsumptionReport, Kitchen, ReportQuery};
use crate::auth::middleware::AuthenticatedUser;
use crate::AppState;

/// Consumption & waste report
/// GET /api/analytics/consumption
#[utoipa::path(
    get,
    path = "/api/analytics/consumption",
    params(ReportQuery),
    responses(
        (status = 200, description = "Per-kitchen summaries, tenant roll-up, and window metadata", body = ConsumptionReport),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid authentication token"),
        (status = 500, description = "Failed to generate consumption report")
    ),
    tag = "analytics"
)]
pub async fn get_consumption_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ConsumptionReport>, AnalyticsError> {
    tracing::debug!(
        "Consumption report requested: user_id={}, days={:?}",
        user.user_id,
        params.days
    );

    // Only `top` is strict; `days` is parsed leniently downstream
    params.validate()?;

    let report = state.analytics_service.consumption_report(&user, &params).await?;
    Ok(Json(report))
}

/// Kitchen list for the reporting UI
/// GET /api/analytics/kitchens
#[utoipa::path(
    get,
    path = "/api/analytics/kitchens",
    responses(
        (status = 200, description = "The tenant's kitchens", body = Vec<Kitchen>),
        (status = 401, description = "Missing or invalid authentication token"),
        (status = 500, description = "Database error")
    ),
    tag = "analytics"
)]
pub async fn list_kitchens(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Kitchen>>, AnalyticsError> {
    tracing::debug!("Kitchen list requested: user_id={}", user.user_id);

    let kitchens = state.analytics_service.list_kitchens(user.tenant_id).await?;
    Ok(Json(kitchens))
}
