use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum TaskhubError {
    DatabaseConnection(String),
    DatabaseOperation(String),
    RepositoryBackendNotFound(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
    Configuration(String),
}

impl TaskhubError {
    /// Stable error code, used in logs and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            TaskhubError::DatabaseConnection(_) => "E001",
            TaskhubError::DatabaseOperation(_) => "E002",
            TaskhubError::RepositoryBackendNotFound(_) => "E003",
            TaskhubError::Validation(_) => "E004",
            TaskhubError::NotFound(_) => "E005",
            TaskhubError::Serialization(_) => "E006",
            TaskhubError::DateParse(_) => "E007",
            TaskhubError::Configuration(_) => "E008",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            TaskhubError::DatabaseConnection(_) => "Database Connection Error",
            TaskhubError::DatabaseOperation(_) => "Database Operation Error",
            TaskhubError::RepositoryBackendNotFound(_) => "Repository Backend Not Found",
            TaskhubError::Validation(_) => "Validation Error",
            TaskhubError::NotFound(_) => "Resource Not Found",
            TaskhubError::Serialization(_) => "Serialization Error",
            TaskhubError::DateParse(_) => "Date Parse Error",
            TaskhubError::Configuration(_) => "Configuration Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TaskhubError::DatabaseConnection(msg) => msg,
            TaskhubError::DatabaseOperation(msg) => msg,
            TaskhubError::RepositoryBackendNotFound(msg) => msg,
            TaskhubError::Validation(msg) => msg,
            TaskhubError::NotFound(msg) => msg,
            TaskhubError::Serialization(msg) => msg,
            TaskhubError::DateParse(msg) => msg,
            TaskhubError::Configuration(msg) => msg,
        }
    }

    /// HTTP status mapping used by the API response helpers.
    pub fn http_status(&self) -> StatusCode {
        match self {
            TaskhubError::Validation(_) | TaskhubError::DateParse(_) => StatusCode::BAD_REQUEST,
            TaskhubError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskhubError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Colored terminal output for fatal startup errors.
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TaskhubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TaskhubError {}

// Convenience constructors
impl TaskhubError {
    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TaskhubError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TaskhubError::DatabaseOperation(msg.into())
    }

    pub fn repository_backend_not_found<T: Into<String>>(msg: T) -> Self {
        TaskhubError::RepositoryBackendNotFound(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TaskhubError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TaskhubError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TaskhubError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        TaskhubError::DateParse(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        TaskhubError::Configuration(msg.into())
    }
}

impl From<rusqlite::Error> for TaskhubError {
    fn from(err: rusqlite::Error) -> Self {
        TaskhubError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TaskhubError {
    fn from(err: std::io::Error) -> Self {
        TaskhubError::DatabaseConnection(err.to_string())
    }
}

impl From<serde_json::Error> for TaskhubError {
    fn from(err: serde_json::Error) -> Self {
        TaskhubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for TaskhubError {
    fn from(err: chrono::ParseError) -> Self {
        TaskhubError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TaskhubError>;
