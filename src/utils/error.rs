use thiserror::Error;

#[derive(Error, Debug)]
pub enum IbError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Invalid granule filename: {name}")]
    GranuleNameError { name: String },

    #[error("Granule error: {message}")]
    GranuleError { message: String },

    #[error("Invalid reanalysis field {file}: {message}")]
    FieldError { file: String, message: String },

    #[error("Missing reanalysis file: {file}")]
    MissingFieldError { file: String },

    #[error("Output already exists: {path}")]
    OutputExistsError { path: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Network,
    System,
}

impl IbError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IbError::MissingConfigError { .. }
            | IbError::InvalidConfigValueError { .. }
            | IbError::ConfigValidationError { .. }
            | IbError::UrlError(_) => ErrorCategory::Configuration,
            IbError::GranuleNameError { .. }
            | IbError::GranuleError { .. }
            | IbError::FieldError { .. }
            | IbError::MissingFieldError { .. }
            | IbError::CsvError(_)
            | IbError::SerializationError(_)
            | IbError::ProcessingError { .. } => ErrorCategory::Data,
            IbError::HttpError(_) => ErrorCategory::Network,
            IbError::ZipError(_) | IbError::IoError(_) | IbError::OutputExistsError { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            IbError::OutputExistsError { .. } => ErrorSeverity::Low,
            IbError::HttpError(_) | IbError::MissingFieldError { .. } => ErrorSeverity::Medium,
            IbError::GranuleNameError { .. }
            | IbError::GranuleError { .. }
            | IbError::FieldError { .. }
            | IbError::CsvError(_)
            | IbError::SerializationError(_)
            | IbError::ProcessingError { .. }
            | IbError::MissingConfigError { .. }
            | IbError::InvalidConfigValueError { .. }
            | IbError::ConfigValidationError { .. }
            | IbError::UrlError(_) => ErrorSeverity::High,
            IbError::ZipError(_) | IbError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            IbError::ZipError(_) => "Check that the granule archive is not corrupted".to_string(),
            IbError::HttpError(_) => {
                "Check the network connection and the reanalysis endpoint, then retry".to_string()
            }
            IbError::CsvError(_) => {
                "Check the land_ice_segments CSV for malformed rows".to_string()
            }
            IbError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            IbError::SerializationError(_) => {
                "Check that ancillary and field JSON documents are well formed".to_string()
            }
            IbError::UrlError(_) => "Check the endpoint URL format".to_string(),
            IbError::GranuleNameError { .. } => {
                "Granule filenames must follow the ATL06 convention, e.g. \
                 ATL06_20181014000347_02350110_006_02.zip"
                    .to_string()
            }
            IbError::GranuleError { .. } => {
                "Check that the granule contains ancillary_data.json and at least one beam"
                    .to_string()
            }
            IbError::FieldError { .. } => {
                "Regenerate the reanalysis field file with the upstream dump tooling".to_string()
            }
            IbError::MissingFieldError { .. } => {
                "Place the file in the data directory or configure --endpoint to fetch it"
                    .to_string()
            }
            IbError::OutputExistsError { .. } => {
                "Re-run with --clobber to overwrite the existing output".to_string()
            }
            IbError::ProcessingError { .. } => {
                "Check that the granule and reanalysis fields overlap in space and time"
                    .to_string()
            }
            IbError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            IbError::InvalidConfigValueError { field, .. }
            | IbError::ConfigValidationError { field, .. } => {
                format!("Correct the value of '{}' and retry", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, IbError>;
