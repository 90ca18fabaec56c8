use std::time::{Duration, Instant};

use slog::debug;
use time::OffsetDateTime;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::{map_store_error, BackendError};
use crate::queries;
use crate::report::ReportSubmission;
use crate::routes::{
    query::SearchQuery,
    rejection::{Context, Rejection},
    response::SuccessResponse,
};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn submit(environment: Environment, submission: ReportSubmission) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::submit(None), e);

        debug!(environment.logger, "Validating submission...");
        let now = OffsetDateTime::now_utc();
        let report = submission.into_report(now).map_err(error_handler)?;
        let id = report.id().to_owned();

        debug!(environment.logger, "Appending report..."; "id" => id.clone());
        environment
            .store
            .append(report.clone())
            .map_err(map_store_error)
            .map_err(|e| Rejection::new(Context::submit(Some(id.clone())), e))?;

        let location = environment.urls.report(&id);
        let response = SuccessResponse::Submitted { id, report };

        with_header(
            with_status(json(&response), StatusCode::CREATED),
            "location",
            location.as_str(),
        )
    }
}

pub async fn list(environment: Environment, query: SearchQuery) -> RouteResult {
    timed! {
        let SearchQuery { q } = query;
        let error_handler = |e: BackendError| Rejection::new(Context::list(q.clone()), e);

        debug!(environment.logger, "Listing reports..."; "query" => q.clone().unwrap_or_default());
        let reports = environment
            .store
            .load()
            .map_err(map_store_error)
            .map_err(error_handler)?;

        let matched = queries::filter(&reports, q.as_deref().unwrap_or(""));
        let reports = queries::sort_by_recency(matched);

        json(&SuccessResponse::Reports { reports })
    }
}

pub async fn retrieve(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve(id.clone()), e);

        debug!(environment.logger, "Retrieving report..."; "id" => id.clone());
        let reports = environment
            .store
            .load()
            .map_err(map_store_error)
            .map_err(error_handler)?;

        match reports.into_iter().find(|r| r.id() == id) {
            Some(report) => with_status(json(&report), StatusCode::OK),
            None => with_status(json(&()), StatusCode::NOT_FOUND),
        }
    }
}

pub async fn count(environment: Environment) -> RouteResult {
    timed! {
        let reports = environment
            .store
            .load()
            .map_err(map_store_error)
            .map_err(|e| Rejection::new(Context::count(), e))?;

        json(&SuccessResponse::Count(reports.len() as u64))
    }
}

pub async fn recent(environment: Environment) -> RouteResult {
    timed! {
        let reports = environment
            .store
            .load()
            .map_err(map_store_error)
            .map_err(|e| Rejection::new(Context::recent(), e))?;

        let mut reports = queries::sort_by_recency(reports);
        reports.truncate(environment.config.recent_limit);

        json(&SuccessResponse::Reports { reports })
    }
}

pub async fn summary(environment: Environment) -> RouteResult {
    timed! {
        let reports = environment
            .store
            .load()
            .map_err(map_store_error)
            .map_err(|e| Rejection::new(Context::summary(), e))?;

        let counts = queries::aggregate_by_type(&reports);

        json(&SuccessResponse::Summary {
            categories: queries::ordered_categories(&counts),
        })
    }
}

pub async fn kpis(environment: Environment) -> RouteResult {
    timed! {
        let reports = environment
            .store
            .load()
            .map_err(map_store_error)
            .map_err(|e| Rejection::new(Context::kpis(), e))?;

        let figures = crate::kpis::kpis(&reports, OffsetDateTime::now_utc());

        json(&figures)
    }
}

pub async fn categories_list(environment: Environment) -> RouteResult {
    timed! {
        debug!(environment.logger, "Listing known categories...");

        // TODO make this cacheable
        json(&SuccessResponse::Categories(queries::known_categories()))
    }
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
