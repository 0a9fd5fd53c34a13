use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required setting: {field}")]
    MissingConfigError { field: String },

    #[error("Could not read input file: {message}")]
    DecodeError { message: String },

    #[error("Column {letter} (position {index}) is missing, input has only {available} columns")]
    MissingColumn {
        index: usize,
        letter: String,
        available: usize,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::CsvError(_)
            | ReportError::DecodeError { .. }
            | ReportError::MissingColumn { .. } => ErrorCategory::Input,
            ReportError::ProcessingError { .. } => ErrorCategory::Processing,
            ReportError::ZipError(_) | ReportError::SerializationError(_) => ErrorCategory::Output,
            ReportError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit status for a failed run. Never 0.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReportError::MissingColumn { .. } => {
                "Export the file again with all columns A to J and re-run the analysis".to_string()
            }
            ReportError::DecodeError { .. } | ReportError::CsvError(_) => {
                "Check that the file is a semicolon or comma separated CSV export".to_string()
            }
            ReportError::InvalidConfigValueError { field, .. }
            | ReportError::ConfigValidationError { field, .. }
            | ReportError::MissingConfigError { field } => {
                format!("Fix the '{}' setting on the command line or in the config file", field)
            }
            ReportError::ConfigError { .. } => {
                "Make sure the config file exists and is valid TOML".to_string()
            }
            ReportError::ZipError(_) | ReportError::SerializationError(_) => {
                "Retry the export; if it keeps failing choose another output format".to_string()
            }
            ReportError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            ReportError::ProcessingError { .. } => {
                "Inspect the input rows reported in the log and re-run".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("The input file could not be analysed: {}", self),
            ErrorCategory::Processing => format!("The analysis failed: {}", self),
            ErrorCategory::Output => format!("The report could not be written: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_is_input_error() {
        let err = ReportError::MissingColumn {
            index: 9,
            letter: "J".to_string(),
            available: 4,
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("Column J"));
        assert!(err.user_friendly_message().contains("could not be analysed"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = ReportError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("writable"));
    }

    #[test]
    fn test_exit_codes_are_non_zero() {
        let errors = vec![
            ReportError::ConfigError {
                message: "bad".to_string(),
            },
            ReportError::MissingConfigError {
                field: "input.path".to_string(),
            },
            ReportError::DecodeError {
                message: "bad".to_string(),
            },
            ReportError::ProcessingError {
                message: "bad".to_string(),
            },
            ReportError::ZipError(zip::result::ZipError::FileNotFound),
            ReportError::from(std::io::Error::other("disk")),
        ];

        let codes: Vec<i32> = errors.iter().map(ReportError::exit_code).collect();
        assert_eq!(codes, vec![1, 1, 1, 1, 2, 3]);
    }
}
