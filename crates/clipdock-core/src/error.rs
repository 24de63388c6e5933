use thiserror::Error;

/// Application-wide error taxonomy. Each upload stage maps its failures into
/// one of these variants so handlers can translate them uniformly.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Staging error: {0}")]
    Staging(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Rewrite error: {0}")]
    Rewrite(String),

    #[error("Placement error: {0}")]
    Placement(String),

    /// The asset reached object storage but the record update failed. A
    /// compensating delete is attempted; the key identifies the object in
    /// case it survived.
    #[error("Orphaned asset {key}: {message}")]
    OrphanedAsset { key: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// True for errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidInput(_)
                | AppError::PayloadTooLarge { .. }
                | AppError::Unauthorized(_)
                | AppError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_flagged() {
        assert!(AppError::InvalidInput("bad".into()).is_client_error());
        assert!(AppError::PayloadTooLarge { size: 10, max: 5 }.is_client_error());
        assert!(AppError::Unauthorized("no".into()).is_client_error());
        assert!(AppError::NotFound("gone".into()).is_client_error());
    }

    #[test]
    fn server_errors_are_not_flagged() {
        assert!(!AppError::Probe("ffprobe exploded".into()).is_client_error());
        assert!(!AppError::OrphanedAsset {
            key: "landscape/abc".into(),
            message: "update failed".into(),
        }
        .is_client_error());
        assert!(!AppError::Internal("oops".into()).is_client_error());
    }
}
