use std::fmt;

#[derive(Debug)]
pub enum ReportshipError {
    ApiKeyNotFound,
    InvalidService,
    InvalidConcurrency(usize),
    IoError(String),
}

impl fmt::Display for ReportshipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportshipError::ApiKeyNotFound => write!(
                f,
                "API key not found. Set REPORTSHIP_API_KEY or REPORTSHIP_API_KEY_FILE"
            ),
            ReportshipError::InvalidService => {
                write!(f, "Service name must be a non-empty string")
            }
            ReportshipError::InvalidConcurrency(value) => {
                write!(f, "Max concurrency must be at least 1, got {value}")
            }
            ReportshipError::IoError(msg) => write!(f, "IO Error: {msg}"),
        }
    }
}

impl std::error::Error for ReportshipError {}

impl From<std::io::Error> for ReportshipError {
    fn from(err: std::io::Error) -> Self {
        ReportshipError::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        assert!(ReportshipError::ApiKeyNotFound
            .to_string()
            .contains("REPORTSHIP_API_KEY"));
        assert!(ReportshipError::InvalidService
            .to_string()
            .contains("non-empty"));
        assert!(ReportshipError::InvalidConcurrency(0)
            .to_string()
            .contains("got 0"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReportshipError = io_err.into();
        assert!(matches!(err, ReportshipError::IoError(_)));
    }
}
