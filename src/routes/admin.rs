//! Back-office endpoints. Everything except login sits behind an admin
//! session.

pub(crate) mod customers;
pub(crate) mod dashboard;
pub(crate) mod engagement;
pub(crate) mod reports;
pub(crate) mod transactions;

use axum::extract::State;
use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::report::ReportPeriod;
use crate::types::request::{AdminQuery, Login};
use crate::types::response::ApiResponse;
use crate::types::user::{AdminLogin, AdminSummary};
use crate::utils::extract::JsonBody;
use crate::utils::params::{Interval, iso, non_blank, parse_date};

const DEFAULT_WINDOW_DAYS: i64 = 30;

/// `startDate`/`endDate` from the query, defaulting to the last 30 days.
pub(crate) fn window(query: &AdminQuery, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = parse_date(query.start_date.as_deref())
        .unwrap_or(now - Duration::days(DEFAULT_WINDOW_DAYS));
    let end = parse_date(query.end_date.as_deref()).unwrap_or(now);

    (start, end)
}

pub(crate) fn period(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    interval: Option<Interval>,
) -> ReportPeriod {
    ReportPeriod {
        start_date: iso(start),
        end_date: iso(end),
        interval,
    }
}

#[instrument(skip_all)]
pub(crate) async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Login>,
) -> Result<ApiResponse<AdminLogin>, Error> {
    let (Some(email), Some(password)) = (
        non_blank(body.email.as_deref()),
        body.password.as_deref().filter(|password| !password.is_empty()),
    ) else {
        return Err(Error::bad_request("Missing required fields: email, password"));
    };

    state
        .user_controller
        .validate_email(email)
        .map_err(|_| Error::bad_request("Invalid email format"))?;

    let admin = state
        .admin_controller
        .credentials(email)
        .await?
        .ok_or(Error::Unauthorized("Invalid email or password"))?;

    if !bcrypt::verify(password, &admin.password_hash)? {
        tracing::warn!("Failed admin login for {}", admin.email);
        return Err(Error::Unauthorized("Invalid email or password"));
    }

    let (token, expires_at) = state.session_controller.create_admin_session(admin.id).await?;

    tracing::info!("Admin {} logged in", admin.id);

    Ok(ApiResponse::ok(
        AdminLogin {
            token,
            admin: AdminSummary {
                id: admin.id,
                email: admin.email,
                full_name: admin.full_name,
                role: "admin",
                expires_at,
            },
        },
        "Admin login successful",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_defaults_to_last_thirty_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();

        let (start, end) = window(&AdminQuery::default(), now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(end, now);

        let query = AdminQuery {
            start_date: Some("2024-01-01".into()),
            end_date: Some("not a date".into()),
            ..Default::default()
        };
        let (start, end) = window(&query, now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, now);
    }

    #[test]
    fn period_omits_missing_interval() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();

        let body = serde_json::to_value(period(&now, &now, None)).unwrap();
        assert_eq!(body["startDate"], "2024-03-31T12:00:00.000Z");
        assert!(body.get("interval").is_none());

        let body = serde_json::to_value(period(&now, &now, Some(Interval::Week))).unwrap();
        assert_eq!(body["interval"], "week");
    }
}
