use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Categories,
    Count,
    Kpis,
    List { query: Option<String> },
    Recent,
    Retrieve { id: String },
    Submit { id: Option<String> },
    Summary,
}

impl Context {
    pub fn categories() -> Context {
        Context::Categories
    }

    pub fn count() -> Context {
        Context::Count
    }

    pub fn kpis() -> Context {
        Context::Kpis
    }

    pub fn list(query: Option<String>) -> Context {
        Context::List { query }
    }

    pub fn recent() -> Context {
        Context::Recent
    }

    pub fn retrieve(id: String) -> Context {
        Context::Retrieve { id }
    }

    pub fn submit(id: Option<String>) -> Context {
        Context::Submit { id }
    }

    pub fn summary() -> Context {
        Context::Summary
    }
}
