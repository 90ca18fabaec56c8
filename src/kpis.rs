use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::queries::{most_common_type, sort_by_recency};
use crate::report::Report;

/// How far back a report still counts as recent, boundary inclusive.
const RECENT_WINDOW_DAYS: i64 = 30;

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// The dashboard headline figures.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Total number of reports.
    pub total: u64,

    /// Number of anonymous reports.
    pub anonymous: u64,

    /// The most frequent concern type; `None` for an empty
    /// collection.
    pub most_common_category: Option<String>,

    /// Reports whose age is at most thirty days. Future-dated
    /// reports have a non-positive age and therefore count.
    pub last_30_days: u64,

    /// Mean report age in fractional days, `0.0` when empty.
    pub average_age_days: f64,

    /// The most recent report, if any.
    pub latest: Option<LatestReport>,
}

/// A compact view of the newest report for the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReport {
    pub id: String,
    pub category: String,

    /// Relative age: `Today`, `Yesterday` or `{n}d ago`.
    pub age_label: String,
}

/// Computes the dashboard figures for the given collection, with
/// `now` as the reference instant.
pub fn kpis(reports: &[Report], now: OffsetDateTime) -> Kpis {
    let total = reports.len() as u64;
    let anonymous = reports.iter().filter(|r| r.is_anonymous()).count() as u64;

    let recent_window = Duration::days(RECENT_WINDOW_DAYS);
    let last_30_days = reports
        .iter()
        .filter(|r| now - r.submitted_at() <= recent_window)
        .count() as u64;

    let average_age_days = if reports.is_empty() {
        0.0
    } else {
        let total_seconds: f64 = reports
            .iter()
            .map(|r| (now - r.submitted_at()).as_seconds_f64())
            .sum();

        total_seconds / SECONDS_PER_DAY / reports.len() as f64
    };

    let latest = sort_by_recency(reports.to_vec()).into_iter().next().map(|report| LatestReport {
        id: report.id().to_owned(),
        category: report.details().kind.clone(),
        age_label: age_label(now - report.submitted_at()),
    });

    Kpis {
        total,
        anonymous,
        most_common_category: most_common_type(reports),
        last_30_days,
        average_age_days,
        latest,
    }
}

/// Turns an age into the relative label shown on the dashboard. Ages
/// under one whole day, including negative ones, are `Today`.
fn age_label(age: Duration) -> String {
    match age.whole_days() {
        1 => "Yesterday".to_owned(),
        days if days > 1 => format!("{}d ago", days),
        _ => "Today".to_owned(),
    }
}
