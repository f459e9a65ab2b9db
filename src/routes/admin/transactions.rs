use axum::extract::{Query, State};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::report::{
    Applied, Listing, TransactionFilter, TransactionFilterOptions, TransactionItem,
};
use crate::types::request::AdminQuery;
use crate::types::response::ApiResponse;
use crate::utils::params::{Page, non_empty, parse_date, parse_uuid};

fn filter(query: &AdminQuery) -> TransactionFilter {
    TransactionFilter {
        search: non_empty(query.search.as_deref()),
        kind: non_empty(query.kind.as_deref()),
        status: non_empty(query.status.as_deref()),
        user_id: parse_uuid(query.user_id.as_deref()),
        start_date: parse_date(query.start_date.as_deref()),
        end_date: parse_date(query.end_date.as_deref()),
    }
}

#[instrument(skip_all)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<ApiResponse<Listing<TransactionItem, TransactionFilter>>, Error> {
    let page = Page::parse(query.page.as_deref(), query.limit.as_deref());
    let filter = filter(&query);

    let reports = &state.reports_controller;
    let (items, total) = tokio::join!(
        reports.transactions(&filter, page),
        reports.transaction_count(&filter)
    );
    let items = items.map_err(|e| Error::upstream("Failed to fetch transactions", e))?;
    let total = total.map_err(|e| Error::upstream("Failed to fetch transaction totals", e))?;

    Ok(ApiResponse::ok(
        Listing {
            items,
            pagination: page.with_total(total),
            filters: Applied { applied: filter },
        },
        "Transactions retrieved successfully",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn filters(
    State(state): State<AppState>,
) -> Result<ApiResponse<TransactionFilterOptions>, Error> {
    let options = state
        .reports_controller
        .transaction_filter_options()
        .await
        .map_err(|e| Error::upstream("Failed to fetch filter options", e))?
        .unwrap_or_default();

    Ok(ApiResponse::ok(
        options.with_defaults(),
        "Filter options retrieved successfully",
    ))
}
