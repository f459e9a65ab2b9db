use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use tracing::instrument;

use crate::core::error::Error;
use crate::types::report::{
    ActivityItem, CustomerFilter, CustomerFilterOptions, CustomerItem, DashboardRow, PeriodCount,
    RevenuePoint, ServiceRevenue, ServiceVolume, TransactionFilter, TransactionFilterOptions,
    TransactionItem, TypeShare, VolumePoint,
};
use crate::utils::de::count_from;
use crate::utils::params::{Interval, Page};

/// Calls the externally defined `admin_*` reporting procedures. Every row is
/// read as `to_jsonb(row)` so the procedures can evolve their column types
/// without breaking decoding.
#[derive(Clone, Debug)]
pub(crate) struct ReportsController {
    pool: PgPool,
}

fn decode<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, Error> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Error::Serialize))
        .collect()
}

fn first<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>, Error> {
    rows.into_iter()
        .next()
        .map(|row| serde_json::from_value(row).map_err(Error::Serialize))
        .transpose()
}

impl ReportsController {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub(crate) async fn customers(
        &self,
        filter: &CustomerFilter,
        page: Page,
    ) -> Result<Vec<CustomerItem>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_customers_query(
                search_text => $1::text,
                status_filter => $2::text,
                start_date => $3::timestamptz,
                end_date => $4::timestamptz,
                sort_direction => $5::text,
                limit_count => $6::int,
                offset_count => $7::int
            ) AS r;",
        )
        .bind(&filter.search)
        .bind(filter.status)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.sort.as_str())
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn customer_count(&self, filter: &CustomerFilter) -> Result<i64, Error> {
        let value: Option<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_customers_count(
                search_text => $1::text,
                status_filter => $2::text,
                start_date => $3::timestamptz,
                end_date => $4::timestamptz
            ) AS r;",
        )
        .bind(&filter.search)
        .bind(filter.status)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count_from(
            &value.unwrap_or(Value::Null),
            "admin_customers_count",
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn customer_filter_options(
        &self,
    ) -> Result<Option<CustomerFilterOptions>, Error> {
        let rows: Vec<Value> =
            sqlx::query_scalar("SELECT to_jsonb(r) FROM admin_customers_filter_options() AS r;")
                .fetch_all(&self.pool)
                .await?;

        first(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn dashboard_overview(
        &self,
        current_start: DateTime<Utc>,
        previous_start: DateTime<Utc>,
    ) -> Result<Option<DashboardRow>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_dashboard_overview(
                current_start => $1::timestamptz,
                previous_start => $2::timestamptz
            ) AS r;",
        )
        .bind(current_start)
        .bind(previous_start)
        .fetch_all(&self.pool)
        .await?;

        first(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityItem>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_dashboard_recent_activity(limit_count => $1::int) AS r;",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    /// `procedure` is one of the engagement series procedures, which share a
    /// signature.
    async fn engagement_series(
        &self,
        procedure: &'static str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PeriodCount>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(&format!(
            "SELECT to_jsonb(r) FROM {procedure}(
                start_date => $1::timestamptz,
                end_date => $2::timestamptz,
                interval_unit => $3::text
            ) AS r;"
        ))
        .bind(start_date)
        .bind(end_date)
        .bind(interval.as_str())
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn new_users(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PeriodCount>, Error> {
        self.engagement_series("admin_engagement_new_users", start_date, end_date, interval)
            .await
    }

    #[instrument(skip(self))]
    pub(crate) async fn active_users(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PeriodCount>, Error> {
        self.engagement_series(
            "admin_engagement_active_users",
            start_date,
            end_date,
            interval,
        )
        .await
    }

    #[instrument(skip(self))]
    pub(crate) async fn service_revenue(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ServiceRevenue>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_service_performance_revenue(
                start_date => $1::timestamptz,
                end_date => $2::timestamptz,
                limit_count => $3::int
            ) AS r;",
        )
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn service_volume(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ServiceVolume>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_service_performance_volume(
                start_date => $1::timestamptz,
                end_date => $2::timestamptz,
                limit_count => $3::int
            ) AS r;",
        )
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn transaction_volume(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<VolumePoint>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_reports_transaction_volume(
                start_date => $1::timestamptz,
                end_date => $2::timestamptz,
                interval_unit => $3::text
            ) AS r;",
        )
        .bind(start_date)
        .bind(end_date)
        .bind(interval.as_str())
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn revenue_trends(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Vec<RevenuePoint>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_reports_revenue_trends(
                start_date => $1::timestamptz,
                end_date => $2::timestamptz
            ) AS r;",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn type_distribution(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Vec<TypeShare>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_reports_type_distribution(
                start_date => $1::timestamptz,
                end_date => $2::timestamptz
            ) AS r;",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn transactions(
        &self,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<Vec<TransactionItem>, Error> {
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_transactions_query(
                search_text => $1::text,
                filter_type => $2::text,
                filter_status => $3::text,
                filter_user => $4::uuid,
                start_date => $5::timestamptz,
                end_date => $6::timestamptz,
                limit_count => $7::int,
                offset_count => $8::int
            ) AS r;",
        )
        .bind(&filter.search)
        .bind(&filter.kind)
        .bind(&filter.status)
        .bind(filter.user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        decode(rows)
    }

    #[instrument(skip(self))]
    pub(crate) async fn transaction_count(&self, filter: &TransactionFilter) -> Result<i64, Error> {
        let value: Option<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM admin_transactions_count(
                search_text => $1::text,
                filter_type => $2::text,
                filter_status => $3::text,
                filter_user => $4::uuid,
                start_date => $5::timestamptz,
                end_date => $6::timestamptz
            ) AS r;",
        )
        .bind(&filter.search)
        .bind(&filter.kind)
        .bind(&filter.status)
        .bind(filter.user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count_from(
            &value.unwrap_or(Value::Null),
            "admin_transactions_count",
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn transaction_filter_options(
        &self,
    ) -> Result<Option<TransactionFilterOptions>, Error> {
        let rows: Vec<Value> =
            sqlx::query_scalar("SELECT to_jsonb(r) FROM admin_transactions_filter_options() AS r;")
                .fetch_all(&self.pool)
                .await?;

        first(rows)
    }
}
