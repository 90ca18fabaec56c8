use url::Url;

/// Convenience wrapper for URL generation functions.
#[derive(Clone)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,

    /// Path for all reports-related actions.
    pub(crate) reports_path: String,

    /// Prefix for all reports-related actions.
    reports_prefix: String,
}

impl Urls {
    /// Create a new instance. `reports_prefix` should *not* include a trailing slash.
    pub fn new(base: impl AsRef<str>, reports_prefix: impl Into<String>) -> Self {
        let base =
            Url::parse(base.as_ref()).unwrap_or_else(|_| panic!("parse {} as URL", base.as_ref()));
        let reports_path = reports_prefix.into();
        let reports_prefix = format!("{}/", reports_path);

        Urls {
            base,
            reports_path,
            reports_prefix,
        }
    }

    pub fn reports(&self) -> Url {
        self.base
            .join(&self.reports_prefix)
            .expect("get reports URL")
    }

    /// The canonical URL for a single report. Reference numbers only
    /// contain URL-safe characters, so the join cannot fail in
    /// practice.
    pub fn report(&self, id: &str) -> Url {
        self.reports()
            .join(&format!("id/{}", id))
            .unwrap_or_else(|_| panic!("get URL for report {}", id))
    }
}
