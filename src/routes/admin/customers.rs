use axum::Extension;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::report::{
    Applied, CustomerDetail, CustomerFilter, CustomerFilterOptions, CustomerItem, Listing,
    StatusChange,
};
use crate::types::request::{AdminQuery, CustomerStatus};
use crate::types::response::ApiResponse;
use crate::types::user::AuthorizedAdmin;
use crate::utils::extract::JsonBody;
use crate::utils::params::{Page, SortDirection, non_empty, parse_date, parse_uuid};

fn customer_status(value: Option<&str>) -> Option<&'static str> {
    match value.map(|value| value.trim().to_lowercase()).as_deref() {
        Some("active") => Some("active"),
        Some("suspended") => Some("suspended"),
        _ => None,
    }
}

fn filter(query: &AdminQuery) -> CustomerFilter {
    CustomerFilter {
        search: non_empty(query.search.as_deref()),
        status: customer_status(query.status.as_deref()),
        start_date: parse_date(query.start_date.as_deref()),
        end_date: parse_date(query.end_date.as_deref()),
        sort: SortDirection::parse(query.sort.as_deref()),
    }
}

#[instrument(skip_all)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<ApiResponse<Listing<CustomerItem, CustomerFilter>>, Error> {
    let page = Page::parse(query.page.as_deref(), query.limit.as_deref());
    let filter = filter(&query);

    let reports = &state.reports_controller;
    let (items, total) = tokio::join!(
        reports.customers(&filter, page),
        reports.customer_count(&filter)
    );
    let items = items.map_err(|e| Error::upstream("Failed to fetch customers", e))?;
    let total = total.map_err(|e| Error::upstream("Failed to fetch customer totals", e))?;

    Ok(ApiResponse::ok(
        Listing {
            items,
            pagination: page.with_total(total),
            filters: Applied { applied: filter },
        },
        "Customers retrieved successfully",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn filters(
    State(state): State<AppState>,
) -> Result<ApiResponse<CustomerFilterOptions>, Error> {
    let options = state
        .reports_controller
        .customer_filter_options()
        .await
        .map_err(|e| Error::upstream("Failed to fetch filter options", e))?
        .ok_or_else(|| Error::upstream("Failed to fetch filter options", "no rows returned"))?;

    Ok(ApiResponse::ok(
        options.with_defaults(),
        "Customer filter options retrieved successfully",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<CustomerDetail>, Error> {
    let id = parse_uuid(Some(id.as_str())).ok_or_else(|| Error::bad_request("Invalid customer id"))?;

    let customer = state
        .admin_controller
        .customer(id)
        .await?
        .ok_or_else(|| Error::not_found("Customer not found"))?;

    Ok(ApiResponse::ok(
        customer,
        "Customer details retrieved successfully",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn update_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthorizedAdmin>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<CustomerStatus>,
) -> Result<ApiResponse<StatusChange>, Error> {
    let id = parse_uuid(Some(id.as_str())).ok_or_else(|| Error::bad_request("Invalid customer id"))?;
    let status = customer_status(body.status.as_deref())
        .ok_or_else(|| Error::bad_request("Invalid status value"))?;

    let change = state
        .admin_controller
        .set_customer_status(id, status)
        .await
        .map_err(|e| Error::upstream("Failed to update customer status", e))?
        .ok_or_else(|| Error::not_found("Customer not found"))?;

    tracing::info!(
        "Customer {} is now {} (by admin {} <{}>)",
        change.id,
        change.status,
        admin.id,
        admin.email
    );

    Ok(ApiResponse::ok(
        change,
        "Customer status updated successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_statuses_filter() {
        assert_eq!(customer_status(Some(" Suspended ")), Some("suspended"));
        assert_eq!(customer_status(Some("active")), Some("active"));
        assert_eq!(customer_status(Some("deleted")), None);
        assert_eq!(customer_status(None), None);
    }

    #[test]
    fn filter_reads_query() {
        let query = AdminQuery {
            search: Some("  ada ".into()),
            status: Some("banned".into()),
            start_date: Some("2024-01-01".into()),
            sort: Some("ASC".into()),
            ..Default::default()
        };

        let filter = filter(&query);
        assert_eq!(filter.search.as_deref(), Some("ada"));
        assert_eq!(filter.status, None);
        assert!(filter.start_date.is_some());
        assert!(filter.end_date.is_none());
        assert_eq!(filter.sort, SortDirection::Asc);
    }
}
