use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    // Configuration errors: detected before any remote call, never retried
    #[error("config error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("dataset size ({items}) doesn't match embeddings size ({vectors})")]
    SizeMismatch { items: usize, vectors: usize },

    // Collection errors
    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },

    // Transient remote errors: eligible for the upload retry policy
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    // Non-transient remote errors
    #[error("remote error (status {status}): {message}")]
    Remote { status: u16, message: String },

    // Serialization errors
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // Embedding errors
    #[error("embedding error: {0}")]
    Embedding(String),
}

impl From<reqwest::Error> for BenchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BenchError::Timeout(e.to_string())
        } else if e.is_connect() || e.is_request() || e.is_body() {
            BenchError::Transport(e.to_string())
        } else if e.is_decode() {
            BenchError::Remote {
                status: 0,
                message: format!("malformed response: {e}"),
            }
        } else {
            BenchError::Remote {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

impl BenchError {
    /// Whether a failed upsert may be retried under the upload retry policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, BenchError::Timeout(_) | BenchError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BenchError::Timeout("upsert".into()).is_transient());
        assert!(BenchError::Transport("connection reset".into()).is_transient());

        assert!(!BenchError::Config("missing url".into()).is_transient());
        assert!(!BenchError::SizeMismatch {
            items: 3,
            vectors: 2
        }
        .is_transient());
        assert!(!BenchError::CollectionNotFound {
            collection: "c".into()
        }
        .is_transient());
        assert!(!BenchError::Remote {
            status: 400,
            message: "bad vector".into()
        }
        .is_transient());
    }

    #[test]
    fn test_display_formatting() {
        let err = BenchError::SizeMismatch {
            items: 20,
            vectors: 19,
        };
        let msg = err.to_string();
        assert!(msg.contains("20"));
        assert!(msg.contains("19"));

        let err = BenchError::CollectionNotFound {
            collection: "quantized_binary".into(),
        };
        assert!(err.to_string().contains("quantized_binary"));

        let err = BenchError::Remote {
            status: 503,
            message: "overloaded".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BenchError = json_err.into();
        assert!(matches!(err, BenchError::Json(_)));
        assert!(!err.is_transient());
    }
}
