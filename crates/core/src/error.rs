//! Domain-level error type shared across the workspace.

/// Errors produced at the domain boundary.
///
/// The catalog index and rewards engine themselves are total over their
/// input domain and never fail; `CoreError` exists for validation at the
/// ingestion boundary (malformed lesson records) and for lookups the HTTP
/// layer wants to surface as 404s.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup by id came up empty.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A boundary record failed validation.
    #[error("{0}")]
    Validation(String),
}
