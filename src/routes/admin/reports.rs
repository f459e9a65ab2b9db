use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::routes::admin::{period, window};
use crate::types::report::{REPORT_TYPES, ReportFilters, ReportsOverview, TIME_RANGES};
use crate::types::request::AdminQuery;
use crate::types::response::ApiResponse;
use crate::utils::params::Interval;

#[instrument(skip_all)]
pub(crate) async fn filters() -> ApiResponse<ReportFilters> {
    let end = Utc::now();
    let start = end - Duration::days(30);

    ApiResponse::ok(
        ReportFilters {
            report_types: REPORT_TYPES,
            time_ranges: TIME_RANGES,
            defaults: period(&start, &end, Some(Interval::Month)),
        },
        "Report filters retrieved successfully",
    )
}

async fn build_overview(
    state: &AppState,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Interval,
) -> Result<ReportsOverview, Error> {
    let reports = &state.reports_controller;
    let (volume, revenue, distribution) = tokio::join!(
        reports.transaction_volume(start, end, interval),
        reports.revenue_trends(start, end),
        reports.type_distribution(start, end)
    );
    let volume = volume.map_err(|e| Error::upstream("Failed to fetch transaction volume", e))?;
    let revenue = revenue.map_err(|e| Error::upstream("Failed to fetch revenue trends", e))?;
    let distribution = distribution
        .map_err(|e| Error::upstream("Failed to fetch transaction type distribution", e))?;

    Ok(ReportsOverview::new(
        period(&start, &end, Some(interval)),
        volume,
        revenue,
        distribution,
    ))
}

#[instrument(skip_all)]
pub(crate) async fn overview(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<ApiResponse<ReportsOverview>, Error> {
    let (start, end) = window(&query, Utc::now());
    let interval = Interval::parse(query.interval.as_deref());

    let overview = build_overview(&state, start, end, interval).await?;

    Ok(ApiResponse::ok(
        overview,
        "Reports overview retrieved successfully",
    ))
}

fn export_filename(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    format!(
        "transaction-volume-{}-{}.csv",
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    )
}

/// Transaction volume for the requested window as a CSV attachment.
#[instrument(skip_all)]
pub(crate) async fn export(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<impl IntoResponse, Error> {
    let (start, end) = window(&query, Utc::now());
    let interval = Interval::parse(query.interval.as_deref());

    let overview = build_overview(&state, start, end, interval).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_filename(&start, &end)),
            ),
        ],
        overview.volume_csv(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn filters_list_report_types_and_ranges() {
        let body = serde_json::to_value(filters().await).unwrap();

        assert_eq!(body["data"]["reportTypes"][1]["label"], "Transaction Volume");
        assert_eq!(body["data"]["timeRanges"][2]["id"], "12m");
        assert_eq!(body["data"]["defaults"]["interval"], "month");
    }

    #[test]
    fn export_filename_carries_the_window() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        assert_eq!(
            export_filename(&start, &end),
            "transaction-volume-20240101-20240131.csv"
        );
    }
}
