use serde::Serialize;

use crate::queries::CategoryCount;
use crate::report::Report;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Categories(Vec<String>),
    Count(u64),
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    Reports {
        reports: Vec<Report>,
    },
    Submitted {
        id: String,
        report: Report,
    },
    Summary {
        categories: Vec<CategoryCount>,
    },
}
