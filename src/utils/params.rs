use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::types::response::Pagination;

pub(crate) fn parse_integer(value: Option<&str>, fallback: i64) -> i64 {
    value
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(fallback)
}

/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` and plain dates.
pub(crate) fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

pub(crate) fn parse_uuid(value: Option<&str>) -> Option<Uuid> {
    let value = value?.trim();
    if value.len() != 36 || !value.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        return None;
    }

    Uuid::parse_str(value).ok()
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Trimmed value when present and not blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) fn iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn serialize_iso<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&iso(date)),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Interval {
    Day,
    Week,
    Month,
}

impl Interval {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("day") => Interval::Day,
            Some("week") => Interval::Week,
            _ => Interval::Month,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Interval::Day => "day",
            Interval::Week => "week",
            Interval::Month => "month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Page {
    pub(crate) page: i64,
    pub(crate) limit: i64,
}

impl Page {
    pub(crate) fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_integer(page, 1).max(1),
            limit: parse_integer(limit, 25).clamp(1, 100),
        }
    }

    pub(crate) fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub(crate) fn with_total(&self, total: i64) -> Pagination {
        let total_pages = if total <= 0 {
            1
        } else {
            ((total + self.limit - 1) / self.limit).max(1)
        };

        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
        }
    }
}

/// Percentage change from `previous` to `current`, 100 when starting from zero.
pub(crate) fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }

    (current - previous) / previous * 100.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn integers_fall_back_when_missing_or_invalid() {
        assert_eq!(parse_integer(None, 25), 25);
        assert_eq!(parse_integer(Some("abc"), 25), 25);
        assert_eq!(parse_integer(Some(" 40 "), 25), 40);
    }

    #[test]
    fn page_is_clamped() {
        let page = Page::parse(Some("0"), Some("1000"));
        assert_eq!(page, Page { page: 1, limit: 100 });

        let page = Page::parse(Some("3"), Some("-5"));
        assert_eq!(page, Page { page: 3, limit: 1 });
        assert_eq!(page.offset(), 2);

        let page = Page::parse(None, None);
        assert_eq!(page, Page { page: 1, limit: 25 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn total_pages_is_at_least_one() {
        let page = Page::parse(Some("2"), Some("10"));

        assert_eq!(page.with_total(0).total_pages, 1);
        assert_eq!(page.with_total(10).total_pages, 1);
        assert_eq!(page.with_total(11).total_pages, 2);
        assert_eq!(page.with_total(95).total_pages, 10);
    }

    #[test]
    fn dates_accept_common_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        assert_eq!(parse_date(Some("2024-03-01")), Some(expected));
        assert_eq!(parse_date(Some("2024-03-01T00:00:00Z")), Some(expected));
        assert_eq!(parse_date(Some("2024-03-01T01:00:00+01:00")), Some(expected));
        assert_eq!(parse_date(Some("2024-03-01T00:00:00")), Some(expected));
        assert_eq!(parse_date(Some("yesterday")), None);
        assert_eq!(parse_date(Some("")), None);
    }

    #[test]
    fn uuid_requires_canonical_shape() {
        assert!(parse_uuid(Some("3f2504e0-4f89-11d3-9a0c-0305e82c3301")).is_some());
        assert!(parse_uuid(Some(" 3f2504e0-4f89-11d3-9a0c-0305e82c3301 ")).is_some());
        assert!(parse_uuid(Some("3f2504e04f8911d39a0c0305e82c3301")).is_none());
        assert!(parse_uuid(Some("not-a-uuid")).is_none());
        assert!(parse_uuid(None).is_none());
    }

    #[test]
    fn intervals_and_sorting_default_sensibly() {
        assert_eq!(Interval::parse(Some("WEEK")), Interval::Week);
        assert_eq!(Interval::parse(Some("hour")), Interval::Month);
        assert_eq!(Interval::parse(None).as_str(), "month");
        assert_eq!(SortDirection::parse(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("sideways")).as_str(), "desc");
    }

    #[test]
    fn change_from_zero_is_capped() {
        assert_eq!(percent_change(5.0, 0.0), 100.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(round2(percent_change(1.0, 3.0)), -66.67);
    }

    #[test]
    fn iso_uses_millisecond_precision() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        assert_eq!(iso(&date), "2024-03-01T12:30:00.000Z");
    }

    #[test]
    fn blank_filters_are_dropped() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" ada ")), Some("ada".to_owned()));
        assert_eq!(non_blank(Some(" ada ")), Some("ada"));
        assert_eq!(non_blank(Some("")), None);
    }
}
