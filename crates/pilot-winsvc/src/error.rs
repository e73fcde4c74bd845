//! Error types for pilot-winsvc

/// Service control errors
#[derive(Debug, thiserror::Error)]
pub enum SvcError {
    #[error("failed to run {command}: {source}")]
    Exec {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("no backing process for service: {0}")]
    NoPid(String),

    #[error("status response contained no records")]
    EmptyResponse,
}
