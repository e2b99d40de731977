use thiserror::Error;

/// Top-level error type for bibtag.
#[derive(Debug, Error)]
pub enum BibError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("detector error ({backend}): {message}")]
    Detector { backend: String, message: String },

    #[error("number too large to represent: {0}")]
    NumberOverflow(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BibError {
    pub fn detector(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Detector {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_error_names_backend() {
        let err = BibError::detector("ollama", "HTTP 500");
        assert_eq!(err.to_string(), "detector error (ollama): HTTP 500");
    }

    #[test]
    fn overflow_error_keeps_digit_run() {
        let err = BibError::NumberOverflow("99999999999999999999999".into());
        assert!(err.to_string().contains("99999999999999999999999"));
    }
}
