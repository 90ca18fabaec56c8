use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A required intake field was absent or blank.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// The incident date was supplied but could not be parsed.
    #[error("could not parse incident date {date:?}")]
    InvalidIncidentDate {
        date: String,
        source: time::ParseError,
    },

    /// A report with the same reference number already exists.
    #[error("report {id} already exists")]
    IdAlreadyExists { id: String },

    /// The persistence layer failed.
    #[error("store error")]
    Store {
        #[from]
        source: StoreError,
    },
}

/// Enumerates errors returned by the store subsystem.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read or write the report blob")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("could not serialize the report blob")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("could not replace the report blob atomically")]
    Persist {
        #[from]
        source: tempfile::PersistError,
    },

    /// Append was asked to insert a reference number that is already
    /// present.
    #[error("duplicate report id {0}")]
    DuplicateId(String),
}

/// Maps store failures onto the API error space, pulling duplicate
/// reference numbers out into their own variant.
pub fn map_store_error(error: StoreError) -> BackendError {
    match error {
        StoreError::DuplicateId(id) => BackendError::IdAlreadyExists { id },
        source => BackendError::Store { source },
    }
}
