/// Errors that can occur within the catalog layer.
///
/// # Examples
///
/// ```rust
/// use relaypost_catalog::error::CatalogError;
///
/// let err = CatalogError::NotFound {
///     entity: "event",
///     id: "retailer_banned".to_string(),
/// };
/// assert!(err.to_string().contains("retailer_banned"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A required record was not found in the catalog.
    #[error("Catalog: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// A template field was addressed that does not exist for the channel
    /// (e.g. `subject` on an SMS template).
    #[error("Catalog: field '{field}' does not exist for channel '{channel}'")]
    InvalidField { channel: String, field: String },

    /// JSON serialization or deserialization failed while exchanging
    /// configuration with the backing store.
    #[error("Catalog: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic catalog error for cases not covered by other variants.
    #[error("Catalog: {0}")]
    Other(String),
}

/// Convenience `Result` alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
