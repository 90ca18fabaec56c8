use serde::Serialize;

use crate::normalization::normalize_query;
use crate::report::Report;

/// Category display order used by the dashboard chart. Categories the
/// collection contains beyond these are appended alphabetically.
const PREFERRED_CATEGORIES: [&str; 6] =
    ["Harassment", "Fraud", "Ethics", "Safety", "Legal", "Other"];

/// One bar of the category chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Returns the reports matching `query`, preserving input order.
///
/// Matching is a case-insensitive substring test against the
/// reference number, the concern type and the location. An empty or
/// whitespace-only query matches everything.
pub fn filter(reports: &[Report], query: &str) -> Vec<Report> {
    let needle = normalize_query(query);

    if needle.is_empty() {
        return reports.to_vec();
    }

    reports
        .iter()
        .filter(|report| {
            normalize_query(report.id()).contains(&needle)
                || normalize_query(&report.details().kind).contains(&needle)
                || normalize_query(&report.details().location).contains(&needle)
        })
        .cloned()
        .collect()
}

/// Sorts into presentation order: descending `submitted_at`. The sort
/// is stable, so reports sharing a timestamp keep their stored
/// relative order.
pub fn sort_by_recency(mut reports: Vec<Report>) -> Vec<Report> {
    reports.sort_by(|a, b| b.submitted_at().cmp(&a.submitted_at()));

    reports
}

/// Counts reports per concern type, in first-seen order. The counts
/// sum to the input length.
pub fn aggregate_by_type(reports: &[Report]) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = vec![];

    for report in reports {
        let kind = &report.details().kind;

        match counts.iter_mut().find(|(k, _)| k == kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((kind.clone(), 1)),
        }
    }

    counts
}

/// Returns the most frequent concern type. The first-seen type wins
/// ties; `None` only for an empty collection.
pub fn most_common_type(reports: &[Report]) -> Option<String> {
    let counts = aggregate_by_type(reports);

    counts
        .iter()
        .fold(None::<&(String, u64)>, |best, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        })
        .map(|(kind, _)| kind.clone())
}

/// Arranges aggregated counts into chart order: the preferred
/// categories first, then any remaining labels alphabetically.
pub fn ordered_categories(counts: &[(String, u64)]) -> Vec<CategoryCount> {
    let count_for = |label: &str| {
        counts
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, count)| *count)
    };

    let mut ordered: Vec<CategoryCount> = PREFERRED_CATEGORIES
        .iter()
        .filter_map(|label| {
            count_for(label).map(|count| CategoryCount {
                category: (*label).to_owned(),
                count,
            })
        })
        .collect();

    let mut rest: Vec<&(String, u64)> = counts
        .iter()
        .filter(|(k, _)| !PREFERRED_CATEGORIES.contains(&k.as_str()))
        .collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));

    ordered.extend(rest.into_iter().map(|(category, count)| CategoryCount {
        category: category.clone(),
        count: *count,
    }));

    ordered
}

/// The category labels the intake form offers.
pub fn known_categories() -> Vec<String> {
    PREFERRED_CATEGORIES.iter().map(|c| (*c).to_string()).collect()
}
