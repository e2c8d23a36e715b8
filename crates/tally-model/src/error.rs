use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("competitor id must not be empty")]
    EmptyCompetitorId,

    #[error("column key must not be empty")]
    EmptyColumnKey,

    #[error("field path must have at least one segment")]
    EmptyPath,

    #[error("field path {path:?} contains an empty segment")]
    EmptyPathSegment { path: String },

    #[error("event document must be an object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("`results` must be an object keyed by competitor id, found {found}")]
    InvalidResults { found: &'static str },

    #[error("invalid event date {value:?}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
