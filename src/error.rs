use std::fmt;
use std::path::PathBuf;

/// Custom error type for registry and migration operations
#[derive(Debug)]
pub enum TfeError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// API returned an error response
    Api { status: u16, message: String },
    /// Token not found in any source
    TokenNotFound(String),
    /// Failed to read or parse credentials file
    Credentials(String),
    /// JSON parsing error
    Json(String),
    /// Configuration error
    Config(String),
    /// Local file I/O failed
    Io(std::io::Error),
    /// Migration plan file is already present
    PlanFileExists(PathBuf),
    /// Repository identifier is not shaped `org/repo`
    UnsupportedFormat(String),
    /// Module configuration this tool cannot migrate
    UnsupportedConfig(String),
    /// A required field is absent from a module record
    MissingData(String),
    /// Deleting a module failed; nothing was changed for it
    DeleteModule { name: String, source: Box<TfeError> },
    /// Creating a module failed after its deletion
    CreateModule { name: String, source: Box<TfeError> },
}

impl fmt::Display for TfeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TfeError::Http(e) => write!(f, "HTTP request failed: {}", e),
            TfeError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            TfeError::TokenNotFound(msg) => write!(f, "{}", msg),
            TfeError::Credentials(msg) => write!(f, "{}", msg),
            TfeError::Json(msg) => write!(f, "JSON error: {}", msg),
            TfeError::Config(msg) => write!(f, "Configuration error: {}", msg),
            TfeError::Io(e) => write!(f, "I/O error: {}", e),
            TfeError::PlanFileExists(path) => {
                write!(f, "Plan file '{}' already exists", path.display())
            }
            TfeError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            TfeError::UnsupportedConfig(msg) => write!(f, "Unsupported configuration: {}", msg),
            TfeError::MissingData(msg) => write!(f, "Missing data: {}", msg),
            TfeError::DeleteModule { name, source } => {
                write!(f, "Failed to delete module {}: {}", name, source)
            }
            TfeError::CreateModule { name, source } => write!(
                f,
                "Failed to create module {}: {} (the module was deleted and has NOT been recreated)",
                name, source
            ),
        }
    }
}

impl std::error::Error for TfeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TfeError::Http(e) => Some(e),
            TfeError::Io(e) => Some(e),
            TfeError::DeleteModule { source, .. } | TfeError::CreateModule { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TfeError {
    fn from(err: reqwest::Error) -> Self {
        TfeError::Http(err)
    }
}

impl From<serde_json::Error> for TfeError {
    fn from(err: serde_json::Error) -> Self {
        TfeError::Json(err.to_string())
    }
}

impl From<std::io::Error> for TfeError {
    fn from(err: std::io::Error) -> Self {
        TfeError::Io(err)
    }
}

/// Result type alias for registry and migration operations
pub type Result<T> = std::result::Result<T, TfeError>;
