//! Rows returned by the reporting procedures and the shapes they are served
//! in. Rows arrive as `to_jsonb(row)` with snake_case keys and leave as
//! camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::response::Pagination;
use crate::utils::de::{integer, number, opt_string};
use crate::utils::params::{Interval, SortDirection, serialize_iso};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CustomerItem {
    #[serde(rename(deserialize = "user_id"), deserialize_with = "opt_string", default)]
    pub(crate) id: Option<String>,
    #[serde(
        rename(serialize = "customerId", deserialize = "customer_id"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) customer_id: Option<String>,
    #[serde(rename(deserialize = "full_name"), deserialize_with = "opt_string", default)]
    pub(crate) name: Option<String>,
    #[serde(deserialize_with = "opt_string", default)]
    pub(crate) email: Option<String>,
    #[serde(deserialize_with = "opt_string", default)]
    pub(crate) phone: Option<String>,
    #[serde(deserialize_with = "status_or_active", default = "active")]
    pub(crate) status: String,
    #[serde(
        rename(serialize = "registrationDate", deserialize = "created_at"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) registration_date: Option<String>,
}

fn active() -> String {
    "active".to_owned()
}

fn status_or_active<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(opt_string(deserializer)?.unwrap_or_else(active))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerFilter {
    pub(crate) search: Option<String>,
    pub(crate) status: Option<&'static str>,
    #[serde(serialize_with = "serialize_iso")]
    pub(crate) start_date: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_iso")]
    pub(crate) end_date: Option<DateTime<Utc>>,
    pub(crate) sort: SortDirection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionFilter {
    pub(crate) search: Option<String>,
    #[serde(rename = "type")]
    pub(crate) kind: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) user_id: Option<Uuid>,
    #[serde(serialize_with = "serialize_iso")]
    pub(crate) start_date: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_iso")]
    pub(crate) end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Applied<F> {
    pub(crate) applied: F,
}

/// A page of list results along with the filters that produced it.
#[derive(Debug, Serialize)]
pub(crate) struct Listing<T, F> {
    pub(crate) items: Vec<T>,
    pub(crate) pagination: Pagination,
    pub(crate) filters: Applied<F>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CustomerFilterOptions {
    #[serde(default)]
    pub(crate) statuses: Option<Value>,
    #[serde(default, rename(serialize = "registrationDates"))]
    pub(crate) registration_dates: Option<Value>,
}

impl CustomerFilterOptions {
    pub(crate) fn with_defaults(mut self) -> Self {
        self.statuses
            .get_or_insert_with(|| Value::from(vec!["active", "suspended"]));
        self.registration_dates
            .get_or_insert_with(|| Value::Object(Default::default()));
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct TransactionFilterOptions {
    #[serde(default, rename(serialize = "transactionTypes"))]
    pub(crate) transaction_types: Option<Value>,
    #[serde(default)]
    pub(crate) statuses: Option<Value>,
    #[serde(default)]
    pub(crate) users: Option<Value>,
}

impl TransactionFilterOptions {
    pub(crate) fn with_defaults(mut self) -> Self {
        for field in [
            &mut self.transaction_types,
            &mut self.statuses,
            &mut self.users,
        ] {
            field.get_or_insert_with(|| Value::Array(Vec::new()));
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Choice {
    pub(crate) id: &'static str,
    pub(crate) label: &'static str,
}

pub(crate) const REPORT_TYPES: [Choice; 4] = [
    Choice {
        id: "overview",
        label: "Overview",
    },
    Choice {
        id: "volume",
        label: "Transaction Volume",
    },
    Choice {
        id: "revenue",
        label: "Revenue Trends",
    },
    Choice {
        id: "distribution",
        label: "Transaction Type Distribution",
    },
];

pub(crate) const TIME_RANGES: [Choice; 3] = [
    Choice {
        id: "30d",
        label: "Last 30 Days",
    },
    Choice {
        id: "90d",
        label: "Last 90 Days",
    },
    Choice {
        id: "12m",
        label: "Last 12 Months",
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportFilters {
    pub(crate) report_types: [Choice; 4],
    pub(crate) time_ranges: [Choice; 3],
    pub(crate) defaults: ReportPeriod,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerDetail {
    pub(crate) id: Uuid,
    pub(crate) customer_id: Uuid,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) status: String,
    pub(crate) registration_date: DateTime<Utc>,
    pub(crate) wallet_balance: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusChange {
    pub(crate) id: Uuid,
    pub(crate) status: String,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DashboardRow {
    #[serde(deserialize_with = "number")]
    pub(crate) total_transactions_current: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) total_transactions_previous: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) revenue_current: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) revenue_previous: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) active_users_current: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) active_users_previous: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) new_users_current: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) new_users_previous: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) total_transactions_all: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) revenue_all: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) active_users_all: f64,
    #[serde(deserialize_with = "number")]
    pub(crate) new_users_all: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct Trend {
    pub(crate) value: f64,
    pub(crate) change: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardTotals {
    pub(crate) transactions: Trend,
    pub(crate) revenue: Trend,
    pub(crate) active_users: Trend,
    pub(crate) new_users: Trend,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AllTimeTotals {
    pub(crate) transactions: f64,
    pub(crate) revenue: f64,
    pub(crate) active_users: f64,
    pub(crate) new_users: f64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ComparisonPeriod {
    pub(crate) current_start: String,
    pub(crate) current_end: String,
    pub(crate) previous_start: String,
    pub(crate) previous_end: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct QuickAction {
    pub(crate) label: &'static str,
    pub(crate) action: &'static str,
}

pub(crate) const QUICK_ACTIONS: [QuickAction; 2] = [
    QuickAction {
        label: "New Transaction",
        action: "start_transaction",
    },
    QuickAction {
        label: "View All Transactions",
        action: "view_transactions",
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardOverview {
    pub(crate) totals: DashboardTotals,
    pub(crate) totals_all_time: AllTimeTotals,
    pub(crate) period: ComparisonPeriod,
    pub(crate) quick_actions: [QuickAction; 2],
}

impl DashboardOverview {
    /// Values rounded to two places, changes relative to the previous window.
    pub(crate) fn from_row(row: &DashboardRow, period: ComparisonPeriod) -> Self {
        use crate::utils::params::{percent_change, round2};

        let trend = |current: f64, previous: f64| Trend {
            value: round2(current),
            change: round2(percent_change(current, previous)),
        };

        Self {
            totals: DashboardTotals {
                transactions: trend(
                    row.total_transactions_current,
                    row.total_transactions_previous,
                ),
                revenue: trend(row.revenue_current, row.revenue_previous),
                active_users: trend(row.active_users_current, row.active_users_previous),
                new_users: trend(row.new_users_current, row.new_users_previous),
            },
            totals_all_time: AllTimeTotals {
                transactions: row.total_transactions_all,
                revenue: round2(row.revenue_all),
                active_users: row.active_users_all,
                new_users: row.new_users_all,
            },
            period,
            quick_actions: QUICK_ACTIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ActivityItem {
    #[serde(deserialize_with = "opt_string", default)]
    pub(crate) id: Option<String>,
    #[serde(rename(deserialize = "user_name"), deserialize_with = "opt_string", default)]
    pub(crate) user: Option<String>,
    #[serde(
        rename(serialize = "transactionType", deserialize = "transaction_type"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) transaction_type: Option<String>,
    #[serde(deserialize_with = "number", default)]
    pub(crate) amount: f64,
    #[serde(deserialize_with = "opt_string", default)]
    pub(crate) status: Option<String>,
    #[serde(rename(deserialize = "created_at"), deserialize_with = "opt_string", default)]
    pub(crate) date: Option<String>,
    #[serde(deserialize_with = "opt_string", default)]
    pub(crate) source: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecentActivity {
    pub(crate) items: Vec<ActivityItem>,
    pub(crate) limit: i64,
    pub(crate) count: usize,
}

/// Engagement series point. The count column is named after the metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PeriodCount {
    #[serde(
        rename(serialize = "periodStart", deserialize = "period_start"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) period_start: Option<String>,
    #[serde(
        rename(serialize = "periodEnd", deserialize = "period_end"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) period_end: Option<String>,
    #[serde(
        alias = "new_users",
        alias = "active_users",
        deserialize_with = "integer",
        default
    )]
    pub(crate) count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportPeriod {
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) interval: Option<Interval>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EngagementTotals {
    pub(crate) new_users: i64,
    pub(crate) active_users: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EngagementOverview {
    pub(crate) period: ReportPeriod,
    pub(crate) new_users: Vec<PeriodCount>,
    pub(crate) active_users: Vec<PeriodCount>,
    pub(crate) totals: EngagementTotals,
}

impl EngagementOverview {
    pub(crate) fn new(
        period: ReportPeriod,
        new_users: Vec<PeriodCount>,
        active_users: Vec<PeriodCount>,
    ) -> Self {
        let totals = EngagementTotals {
            new_users: new_users.iter().map(|point| point.count).sum(),
            active_users: active_users.iter().map(|point| point.count).sum(),
        };

        Self {
            period,
            new_users,
            active_users,
            totals,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ServiceRevenue {
    #[serde(rename(deserialize = "service_name"), deserialize_with = "opt_string", default)]
    pub(crate) service: Option<String>,
    #[serde(rename(deserialize = "total_revenue"), deserialize_with = "number", default)]
    pub(crate) revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ServiceVolume {
    #[serde(rename(deserialize = "service_name"), deserialize_with = "opt_string", default)]
    pub(crate) service: Option<String>,
    #[serde(
        rename(deserialize = "total_transactions"),
        deserialize_with = "integer",
        default
    )]
    pub(crate) transactions: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServicePerformance {
    pub(crate) period: ReportPeriod,
    pub(crate) top_by_revenue: Vec<ServiceRevenue>,
    pub(crate) top_by_volume: Vec<ServiceVolume>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct VolumePoint {
    #[serde(
        rename(serialize = "periodStart", deserialize = "period_start"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) period_start: Option<String>,
    #[serde(
        rename(serialize = "periodEnd", deserialize = "period_end"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) period_end: Option<String>,
    #[serde(
        rename(deserialize = "transaction_count"),
        deserialize_with = "integer",
        default
    )]
    pub(crate) count: i64,
    #[serde(rename(deserialize = "total_amount"), deserialize_with = "number", default)]
    pub(crate) amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RevenuePoint {
    #[serde(
        rename(serialize = "periodStart", deserialize = "period_start"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) period_start: Option<String>,
    #[serde(
        rename(serialize = "totalRevenue", deserialize = "total_revenue"),
        deserialize_with = "number",
        default
    )]
    pub(crate) total_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TypeShare {
    #[serde(
        rename(serialize = "transactionType", deserialize = "transaction_type"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) transaction_type: Option<String>,
    #[serde(
        rename(deserialize = "transaction_count"),
        deserialize_with = "integer",
        default
    )]
    pub(crate) count: i64,
    #[serde(rename(deserialize = "total_amount"), deserialize_with = "number", default)]
    pub(crate) amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct ReportTotals {
    pub(crate) transactions: i64,
    pub(crate) revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportsOverview {
    pub(crate) period: ReportPeriod,
    pub(crate) transaction_volume: Vec<VolumePoint>,
    pub(crate) revenue_trends: Vec<RevenuePoint>,
    pub(crate) type_distribution: Vec<TypeShare>,
    pub(crate) totals: ReportTotals,
}

impl ReportsOverview {
    pub(crate) fn new(
        period: ReportPeriod,
        transaction_volume: Vec<VolumePoint>,
        revenue_trends: Vec<RevenuePoint>,
        type_distribution: Vec<TypeShare>,
    ) -> Self {
        let totals = transaction_volume.iter().fold(
            ReportTotals {
                transactions: 0,
                revenue: 0.0,
            },
            |acc, point| ReportTotals {
                transactions: acc.transactions + point.count,
                revenue: acc.revenue + point.amount,
            },
        );

        Self {
            period,
            transaction_volume,
            revenue_trends,
            type_distribution,
            totals,
        }
    }

    /// Transaction volume series as CSV, one line per period.
    pub(crate) fn volume_csv(&self) -> String {
        let mut csv = String::from("period_start,period_end,transaction_count,total_amount\n");

        for point in &self.transaction_volume {
            csv.push_str(&format!(
                "{},{},{},{:.2}\n",
                csv_field(point.period_start.as_deref()),
                csv_field(point.period_end.as_deref()),
                point.count,
                point.amount
            ));
        }

        csv
    }
}

fn csv_field(value: Option<&str>) -> String {
    match value {
        Some(value) if value.contains([',', '"', '\n']) => {
            format!("\"{}\"", value.replace('"', "\"\""))
        }
        Some(value) => value.to_owned(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TransactionItem {
    #[serde(
        rename(serialize = "transactionId", deserialize = "transaction_id"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) transaction_id: Option<String>,
    #[serde(
        rename(serialize = "userId", deserialize = "user_id"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) user_id: Option<String>,
    #[serde(rename(deserialize = "user_name"), deserialize_with = "opt_string", default)]
    pub(crate) user: Option<String>,
    #[serde(
        rename(serialize = "type", deserialize = "transaction_type"),
        deserialize_with = "opt_string",
        default
    )]
    pub(crate) kind: Option<String>,
    #[serde(deserialize_with = "number", default)]
    pub(crate) amount: f64,
    #[serde(deserialize_with = "opt_string", default)]
    pub(crate) status: Option<String>,
    #[serde(rename(deserialize = "created_at"), deserialize_with = "opt_string", default)]
    pub(crate) date: Option<String>,
    #[serde(deserialize_with = "opt_string", default)]
    pub(crate) source: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_rows_are_renamed_for_clients() {
        let item: CustomerItem = serde_json::from_value(json!({
            "user_id": "9b2f0c55-4a8e-4c55-8f43-2f4b1f0d6a11",
            "customer_id": "CUS_1",
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": null,
            "status": "suspended",
            "created_at": "2024-03-01T00:00:00+00:00"
        }))
        .unwrap();

        let served = serde_json::to_value(&item).unwrap();
        assert_eq!(served["customerId"], "CUS_1");
        assert_eq!(served["name"], "Ada Lovelace");
        assert_eq!(served["status"], "suspended");
        assert_eq!(served["registrationDate"], "2024-03-01T00:00:00+00:00");
        assert!(served["phone"].is_null());
    }

    #[test]
    fn customer_status_defaults_to_active() {
        let item: CustomerItem = serde_json::from_value(json!({"user_id": "x"})).unwrap();
        assert_eq!(item.status, "active");

        let item: CustomerItem =
            serde_json::from_value(json!({"user_id": "x", "status": null})).unwrap();
        assert_eq!(item.status, "active");
    }

    #[test]
    fn dashboard_overview_rounds_and_compares() {
        let row: DashboardRow = serde_json::from_value(json!({
            "total_transactions_current": 30,
            "total_transactions_previous": 20,
            "revenue_current": "1234.567",
            "revenue_previous": "0",
            "active_users_current": 0,
            "active_users_previous": 0,
            "new_users_current": 5,
            "new_users_previous": 10,
            "revenue_all": 99999.999
        }))
        .unwrap();

        let period = ComparisonPeriod {
            current_start: "a".into(),
            current_end: "b".into(),
            previous_start: "c".into(),
            previous_end: "a".into(),
        };
        let overview = DashboardOverview::from_row(&row, period);

        assert_eq!(overview.totals.transactions, Trend { value: 30.0, change: 50.0 });
        assert_eq!(overview.totals.revenue, Trend { value: 1234.57, change: 100.0 });
        assert_eq!(overview.totals.active_users, Trend { value: 0.0, change: 0.0 });
        assert_eq!(overview.totals.new_users, Trend { value: 5.0, change: -50.0 });
        assert_eq!(overview.totals_all_time.revenue, 100000.0);
        assert_eq!(overview.totals_all_time.transactions, 0.0);
    }

    #[test]
    fn engagement_counts_read_metric_columns() {
        let new_users: Vec<PeriodCount> = serde_json::from_value(json!([
            {"period_start": "2024-01-01", "period_end": "2024-02-01", "new_users": 4},
            {"period_start": "2024-02-01", "period_end": "2024-03-01", "new_users": "6"}
        ]))
        .unwrap();
        let active_users: Vec<PeriodCount> =
            serde_json::from_value(json!([{"period_start": "2024-01-01", "active_users": 9}]))
                .unwrap();

        let overview = EngagementOverview::new(
            ReportPeriod {
                start_date: "s".into(),
                end_date: "e".into(),
                interval: Some(Interval::Month),
            },
            new_users,
            active_users,
        );

        assert_eq!(overview.totals.new_users, 10);
        assert_eq!(overview.totals.active_users, 9);

        let served = serde_json::to_value(&overview).unwrap();
        assert_eq!(served["newUsers"][0]["periodStart"], "2024-01-01");
        assert_eq!(served["newUsers"][0]["count"], 4);
        assert_eq!(served["period"]["interval"], "month");
    }

    #[test]
    fn report_totals_sum_volume_and_export_as_csv() {
        let volume: Vec<VolumePoint> = serde_json::from_value(json!([
            {"period_start": "2024-01", "period_end": "2024-02", "transaction_count": 3, "total_amount": "150.5"},
            {"period_start": "2024-02", "period_end": null, "transaction_count": "2", "total_amount": 49.5}
        ]))
        .unwrap();

        let overview = ReportsOverview::new(
            ReportPeriod {
                start_date: "s".into(),
                end_date: "e".into(),
                interval: Some(Interval::Month),
            },
            volume,
            Vec::new(),
            Vec::new(),
        );

        assert_eq!(overview.totals, ReportTotals { transactions: 5, revenue: 200.0 });
        assert_eq!(
            overview.volume_csv(),
            "period_start,period_end,transaction_count,total_amount\n\
             2024-01,2024-02,3,150.50\n\
             2024-02,,2,49.50\n"
        );
    }

    #[test]
    fn csv_fields_are_quoted_when_needed() {
        assert_eq!(csv_field(Some("a,b")), "\"a,b\"");
        assert_eq!(csv_field(Some("say \"hi\"")), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field(None), "");
    }

    #[test]
    fn transaction_rows_expose_type() {
        let item: TransactionItem = serde_json::from_value(json!({
            "transaction_id": "TXN_1",
            "user_id": null,
            "user_name": "Ada",
            "transaction_type": "airtime",
            "amount": "10",
            "status": "completed",
            "created_at": "2024-01-01",
            "source": "wallet"
        }))
        .unwrap();

        let served = serde_json::to_value(&item).unwrap();
        assert_eq!(served["type"], "airtime");
        assert_eq!(served["transactionId"], "TXN_1");
        assert_eq!(served["amount"], 10.0);
        assert!(served["userId"].is_null());
    }

    #[test]
    fn applied_filters_serialise_dates_as_iso() {
        use chrono::TimeZone;

        let filter = CustomerFilter {
            search: Some("ada".into()),
            status: None,
            start_date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            end_date: None,
            sort: SortDirection::Asc,
        };

        let served = serde_json::to_value(&filter).unwrap();
        assert_eq!(served["startDate"], "2024-01-02T03:04:05.000Z");
        assert!(served["endDate"].is_null());
        assert_eq!(served["sort"], "asc");
    }
}
