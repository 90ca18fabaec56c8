use std::sync::atomic::{AtomicU64, Ordering};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::errors::BackendError;
use crate::normalization;

/// A single submitted concern.
///
/// Serialized field names match the persisted blob schema
/// (`submittedAt`, `additionalInfo` and so on).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// The reference number, `ETH-<year>-<suffix>`. Never reassigned.
    id: String,

    /// When the report was submitted. Equals the incident date when
    /// one was supplied, else the creation instant.
    #[serde(with = "iso8601")]
    submitted_at: OffsetDateTime,

    /// Contact details. All fields are empty strings, never omitted,
    /// for anonymous reports.
    contact: Contact,

    /// The report details. All fields are required at creation.
    details: Details,

    /// Supplementary yes/no answers.
    additional_info: AdditionalInfo,

    /// Whether the reporter chose to stay anonymous.
    is_anonymous: bool,
}

impl Report {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn submitted_at(&self) -> OffsetDateTime {
        self.submitted_at
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn additional_info(&self) -> &AdditionalInfo {
        &self.additional_info
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }
}

/// Who submitted the report. Blanked at creation time for anonymous
/// submissions; the store never rewrites these.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// What the report is about.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    /// The concern category, e.g. `Fraud` or `Harassment`.
    #[serde(rename = "type")]
    pub(crate) kind: String,

    /// The location or department concerned.
    pub(crate) location: String,

    /// The date the incident occurred.
    #[serde(with = "iso_date")]
    pub(crate) incident_date: Date,

    /// Free-form description.
    pub(crate) description: String,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    pub(crate) witnesses: bool,
    pub(crate) evidence: bool,
    pub(crate) previously_reported: bool,
}

/// The raw intake payload, before validation. Every field the form
/// can leave blank is optional here so that missing fields surface as
/// [`BackendError::MissingField`] rather than a deserialization error.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    #[serde(default, deserialize_with = "normalization::deserialize_option")]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    /// The concern category.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub location: Option<String>,

    /// The incident date as submitted, `YYYY-MM-DD`.
    pub incident_date: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub witnesses: bool,

    #[serde(default)]
    pub evidence: bool,

    #[serde(default)]
    pub previously_reported: bool,

    #[serde(default)]
    pub anonymous: bool,

    /// The reporter must confirm the statement is truthful.
    #[serde(default)]
    pub confirmation: bool,
}

impl ReportSubmission {
    /// Validates the submission and turns it into a full [`Report`].
    ///
    /// `now` provides the reference-number year. Contact fields are
    /// blanked here, on the creation path, when the submission is
    /// anonymous.
    pub fn into_report(self, now: OffsetDateTime) -> Result<Report, BackendError> {
        let kind = require("type", self.kind)?;
        let location = require("location", self.location)?;
        let incident_raw = require("incidentDate", self.incident_date)?;
        let description = require("description", self.description)?;

        if !self.confirmation {
            return Err(BackendError::MissingField {
                field: "confirmation",
            });
        }

        let incident_date =
            Date::parse(&incident_raw, "%F").map_err(|source| BackendError::InvalidIncidentDate {
                date: incident_raw,
                source,
            })?;

        let contact = if self.anonymous {
            Contact::default()
        } else {
            Contact {
                name: self.name.unwrap_or_default(),
                email: self.email.unwrap_or_default(),
                phone: self.phone.unwrap_or_default(),
            }
        };

        Ok(Report {
            id: generate_id(now),
            // date-only submissions resolve to midnight UTC
            submitted_at: incident_date.midnight().assume_utc(),
            contact,
            details: Details {
                kind,
                location,
                incident_date,
                description,
            },
            additional_info: AdditionalInfo {
                witnesses: self.witnesses,
                evidence: self.evidence,
                previously_reported: self.previously_reported,
            },
            is_anonymous: self.anonymous,
        })
    }
}

fn require(field: &'static str, value: Option<String>) -> Result<String, BackendError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(BackendError::MissingField { field }),
    }
}

lazy_static! {
    // seeded from the millisecond clock so restarts don't reuse suffixes
    static ref ID_COUNTER: AtomicU64 = AtomicU64::new(current_millis());
}

fn current_millis() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}

/// Generates a reference number of the form `ETH-<year>-<5-digit-suffix>`.
///
/// The suffix comes from a process-local counter seeded from the
/// millisecond clock, so two rapid submissions cannot collide within
/// one process. Collisions across restarts are still possible in
/// principle; the store rejects them on append.
pub fn generate_id(now: OffsetDateTime) -> String {
    let suffix = ID_COUNTER.fetch_add(1, Ordering::Relaxed) % 100_000;

    format!("ETH-{}-{:05}", now.year(), suffix)
}

/// The synthetic bootstrap records inserted when the store is empty.
///
/// Six reports, submissions staggered 15 days apart from `now` going
/// back, alternating anonymity. Incident dates sit a deterministic few
/// days before each submission.
pub fn seed_reports(now: OffsetDateTime) -> Vec<Report> {
    const KINDS: [&str; 6] = ["Fraud", "Harassment", "Ethics", "Safety", "Fraud", "Other"];
    const LOCATIONS: [&str; 6] = ["New York", "London", "Remote", "Tokyo", "Berlin", "Chicago"];

    let now = truncate_to_second(now);

    (0..6)
        .map(|i| {
            let submitted_at = now - Duration::days(15 * i as i64);
            let incident_date = (submitted_at - Duration::days(i as i64 + 3)).date();
            let is_anonymous = i % 2 == 0;

            let contact = if is_anonymous {
                Contact::default()
            } else {
                Contact {
                    name: format!("Sample User {}", i + 1),
                    email: format!("user{}@example.com", i + 1),
                    phone: "555-123-4567".to_owned(),
                }
            };

            Report {
                id: format!("ETH-{}-SEED{}", submitted_at.year(), i + 1),
                submitted_at,
                contact,
                details: Details {
                    kind: KINDS[i].to_owned(),
                    location: LOCATIONS[i].to_owned(),
                    incident_date,
                    description: format!(
                        "This is a sample hardcoded report for a {} concern.",
                        KINDS[i]
                    ),
                },
                additional_info: AdditionalInfo {
                    witnesses: i % 3 == 0,
                    evidence: i % 2 != 0,
                    previously_reported: i == 5,
                },
                is_anonymous,
            }
        })
        .collect()
}

/// Drops sub-second precision so timestamps survive a serialization
/// round trip unchanged.
pub fn truncate_to_second(instant: OffsetDateTime) -> OffsetDateTime {
    instant - Duration::nanoseconds(i64::from(instant.time().nanosecond()))
}

pub(crate) mod iso8601 {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    const FORMAT: &str = "%FT%T%z";

    pub fn serialize<S: Serializer>(
        instant: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&instant.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;

        OffsetDateTime::parse(&raw, FORMAT).map_err(de::Error::custom)
    }
}

pub(crate) mod iso_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::Date;

    const FORMAT: &str = "%F";

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;

        Date::parse(&raw, FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use time::OffsetDateTime;

    use super::*;

    fn valid_submission() -> ReportSubmission {
        ReportSubmission {
            name: Some("Jordan Doe".to_owned()),
            email: Some("jordan@example.com".to_owned()),
            phone: Some("555-000-1111".to_owned()),
            kind: Some("Fraud".to_owned()),
            location: Some("Berlin".to_owned()),
            incident_date: Some("2021-03-14".to_owned()),
            description: Some("Expense irregularities.".to_owned()),
            confirmation: true,
            ..ReportSubmission::default()
        }
    }

    #[test]
    fn valid_submission_becomes_report() {
        let report = valid_submission()
            .into_report(OffsetDateTime::now_utc())
            .expect("convert valid submission");

        assert!(report.id().starts_with("ETH-"));
        assert_eq!(report.details().kind, "Fraud");
        assert_eq!(report.details().location, "Berlin");
        assert_eq!(report.contact().name, "Jordan Doe");
        assert!(!report.is_anonymous());
        // date-only incident resolves to midnight UTC
        assert_eq!(report.submitted_at().format("%FT%T"), "2021-03-14T00:00:00");
    }

    #[test]
    fn anonymous_submission_blanks_contact() {
        let submission = ReportSubmission {
            anonymous: true,
            ..valid_submission()
        };

        let report = submission
            .into_report(OffsetDateTime::now_utc())
            .expect("convert anonymous submission");

        assert!(report.is_anonymous());
        assert_eq!(report.contact().name, "");
        assert_eq!(report.contact().email, "");
        assert_eq!(report.contact().phone, "");
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        for blank in &["type", "location", "incidentDate", "description"] {
            let mut submission = valid_submission();

            match *blank {
                "type" => submission.kind = None,
                "location" => submission.location = Some("   ".to_owned()),
                "incidentDate" => submission.incident_date = None,
                "description" => submission.description = Some(String::new()),
                _ => unreachable!(),
            }

            let error = submission
                .into_report(OffsetDateTime::now_utc())
                .expect_err("blank field must be rejected");

            match error {
                BackendError::MissingField { field } => assert_eq!(&field, blank),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn missing_confirmation_is_rejected() {
        let submission = ReportSubmission {
            confirmation: false,
            ..valid_submission()
        };

        let error = submission
            .into_report(OffsetDateTime::now_utc())
            .expect_err("unconfirmed submission must be rejected");

        assert!(matches!(
            error,
            BackendError::MissingField {
                field: "confirmation"
            }
        ));
    }

    #[test]
    fn unparseable_incident_date_is_rejected() {
        let submission = ReportSubmission {
            incident_date: Some("14/03/2021".to_owned()),
            ..valid_submission()
        };

        let error = submission
            .into_report(OffsetDateTime::now_utc())
            .expect_err("unparseable date must be rejected");

        assert!(matches!(error, BackendError::InvalidIncidentDate { .. }));
    }

    #[test]
    fn generated_ids_have_the_documented_shape() {
        let now = OffsetDateTime::now_utc();
        let id = generate_id(now);
        let suffix = id
            .strip_prefix(&format!("ETH-{}-", now.year()))
            .expect("id carries the year prefix");

        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn rapid_generation_does_not_collide() {
        let now = OffsetDateTime::now_utc();
        let ids: HashSet<String> = (0..1_000).map(|_| generate_id(now)).collect();

        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn seed_reports_are_deterministic() {
        let now = OffsetDateTime::now_utc();
        let first = seed_reports(now);
        let second = seed_reports(now);

        assert_eq!(first, second);
        assert_eq!(first.len(), 6);

        let kinds: Vec<&str> = first.iter().map(|r| r.details().kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["Fraud", "Harassment", "Ethics", "Safety", "Fraud", "Other"]
        );

        // alternating anonymity, blanked contact for the anonymous ones
        for (i, report) in first.iter().enumerate() {
            assert_eq!(report.is_anonymous(), i % 2 == 0);
            if report.is_anonymous() {
                assert_eq!(report.contact().name, "");
            } else {
                assert!(!report.contact().name.is_empty());
            }
        }
    }

    #[test]
    fn report_round_trips_through_json() {
        let reports = seed_reports(OffsetDateTime::now_utc());
        let json = serde_json::to_string(&reports).expect("serialize reports");
        let parsed: Vec<Report> = serde_json::from_str(&json).expect("parse reports");

        assert_eq!(parsed, reports);
    }
}
