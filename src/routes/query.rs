use serde::Deserialize;

/// The query string for the list route, e.g. `?q=fraud`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}
