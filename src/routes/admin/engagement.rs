use axum::extract::{Query, State};
use chrono::Utc;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::routes::admin::{period, window};
use crate::types::report::{EngagementOverview, ServicePerformance};
use crate::types::request::AdminQuery;
use crate::types::response::ApiResponse;
use crate::utils::params::{Interval, parse_integer};

#[instrument(skip_all)]
pub(crate) async fn overview(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<ApiResponse<EngagementOverview>, Error> {
    let (start, end) = window(&query, Utc::now());
    let interval = Interval::parse(query.interval.as_deref());

    let reports = &state.reports_controller;
    let (new_users, active_users) = tokio::join!(
        reports.new_users(start, end, interval),
        reports.active_users(start, end, interval)
    );
    let new_users = new_users.map_err(|e| Error::upstream("Failed to fetch new users data", e))?;
    let active_users =
        active_users.map_err(|e| Error::upstream("Failed to fetch active users data", e))?;

    Ok(ApiResponse::ok(
        EngagementOverview::new(period(&start, &end, Some(interval)), new_users, active_users),
        "Engagement overview retrieved successfully",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn services(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<ApiResponse<ServicePerformance>, Error> {
    let (start, end) = window(&query, Utc::now());
    let limit = parse_integer(query.limit.as_deref(), 5).clamp(1, 10);

    let reports = &state.reports_controller;
    let (revenue, volume) = tokio::join!(
        reports.service_revenue(start, end, limit),
        reports.service_volume(start, end, limit)
    );
    let top_by_revenue =
        revenue.map_err(|e| Error::upstream("Failed to fetch service revenue data", e))?;
    let top_by_volume =
        volume.map_err(|e| Error::upstream("Failed to fetch service volume data", e))?;

    Ok(ApiResponse::ok(
        ServicePerformance {
            period: period(&start, &end, None),
            top_by_revenue,
            top_by_volume,
        },
        "Service performance retrieved successfully",
    ))
}
