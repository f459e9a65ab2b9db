use axum::extract::{Query, State};
use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::report::{ComparisonPeriod, DashboardOverview, RecentActivity};
use crate::types::request::AdminQuery;
use crate::types::response::ApiResponse;
use crate::utils::params::{iso, parse_integer};

const COMPARISON_DAYS: i64 = 30;

/// Current window is the last 30 days, compared with the 30 days before it.
fn comparison(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>, ComparisonPeriod) {
    let current_start = now - Duration::days(COMPARISON_DAYS);
    let previous_start = current_start - Duration::days(COMPARISON_DAYS);

    let period = ComparisonPeriod {
        current_start: iso(&current_start),
        current_end: iso(&now),
        previous_start: iso(&previous_start),
        previous_end: iso(&current_start),
    };

    (current_start, previous_start, period)
}

#[instrument(skip_all)]
pub(crate) async fn overview(
    State(state): State<AppState>,
) -> Result<ApiResponse<DashboardOverview>, Error> {
    let (current_start, previous_start, period) = comparison(Utc::now());

    let row = state
        .reports_controller
        .dashboard_overview(current_start, previous_start)
        .await
        .map_err(|e| Error::upstream("Failed to fetch dashboard overview", e))?
        .ok_or_else(|| Error::upstream("Failed to fetch dashboard overview", "no rows returned"))?;

    Ok(ApiResponse::ok(
        DashboardOverview::from_row(&row, period),
        "Dashboard overview retrieved successfully",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn recent_activity(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<ApiResponse<RecentActivity>, Error> {
    let limit = parse_integer(query.limit.as_deref(), 10).clamp(1, 50);

    let items = state
        .reports_controller
        .recent_activity(limit)
        .await
        .map_err(|e| Error::upstream("Failed to fetch recent activity", e))?;

    Ok(ApiResponse::ok(
        RecentActivity {
            count: items.len(),
            items,
            limit,
        },
        "Recent activity retrieved successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn comparison_windows_are_adjacent() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let (current_start, previous_start, period) = comparison(now);

        assert_eq!(current_start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(previous_start, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
        assert_eq!(period.previous_end, period.current_start);
        assert_eq!(period.current_end, "2024-03-31T00:00:00.000Z");
    }
}
