use std::sync::Arc;

use slog::Logger;

use crate::store::ReportStore;
use crate::urls::Urls;

pub type SharedStore = dyn ReportStore + Send + Sync;

/// Everything a route handler needs, passed explicitly instead of
/// living in globals.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub store: Arc<SharedStore>,
    pub urls: Arc<Urls>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        store: Arc<SharedStore>,
        urls: Arc<Urls>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            store,
            urls,
            config,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// How many reports the dashboard's recent table shows.
    pub(crate) recent_limit: usize,
}

impl Config {
    pub fn new(recent_limit: usize) -> Self {
        Self { recent_limit }
    }
}
