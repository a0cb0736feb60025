/// Errors that can occur within the notification subsystem.
///
/// # Examples
///
/// ```rust
/// use relaypost_notify::error::NotifyError;
///
/// let err = NotifyError::InvalidConfig("missing smtp host".to_string());
/// assert!(err.to_string().contains("smtp host"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Provider configuration is missing a required field or contains an
    /// invalid value.
    #[error("Notify: invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// No plugin is registered for the channel.
    #[error("Notify: no provider plugin for channel '{0}'")]
    UnknownChannel(String),

    /// An HTTP request to an external provider failed.
    #[error("Notify: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// SMTP transport error when sending or probing email.
    #[error("Notify: SMTP error: {0}")]
    Smtp(String),

    /// A recipient address could not be parsed for the channel.
    #[error("Notify: invalid recipient address: {0}")]
    Address(String),

    /// JSON serialization or deserialization failed (credential bundles).
    #[error("Notify: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The external API returned a non-success response.
    #[error("Notify: API error from {service}: status={status}, body={body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Generic notification error for cases not covered by other variants.
    #[error("Notify: {0}")]
    Other(String),
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
