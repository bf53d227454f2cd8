//! Unified API error code definitions.

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::TaskhubError;

/// API error code enum, serialized as a number.
///
/// Grouped by thousands:
/// - 0: success
/// - 1000-1099: generic errors
/// - 3000-3099: task errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // Generic errors 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // Task errors 3000-3099
    TaskNotFound = 3000,
    TaskInvalidTitle = 3001,
    TaskInvalidDescription = 3002,
    TaskInvalidDueDate = 3003,
    TaskDatabaseError = 3005,
}

impl From<TaskhubError> for ErrorCode {
    fn from(err: TaskhubError) -> Self {
        match err {
            TaskhubError::Validation(_) => ErrorCode::BadRequest,
            TaskhubError::DateParse(_) => ErrorCode::TaskInvalidDueDate,
            TaskhubError::NotFound(_) => ErrorCode::TaskNotFound,
            TaskhubError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            TaskhubError::DatabaseOperation(_) => ErrorCode::TaskDatabaseError,
            _ => ErrorCode::InternalServerError,
        }
    }
}
