//! Task API helper functions.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::TaskhubError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// Parse a due date in `YYYY-MM-DD` format.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("Invalid due_date '{}'. Use YYYY-MM-DD format", raw))
}

/// Validate a task title against the configured length limits.
pub fn validate_title(title: &str) -> Result<(), String> {
    let config = crate::config::get_config();
    let len = title.chars().count();
    if len < config.api.title_min_length || len > config.api.title_max_length {
        return Err(format!(
            "Title length must be between {} and {} characters",
            config.api.title_min_length, config.api.title_max_length
        ));
    }
    Ok(())
}

/// Validate a task description against the configured length limit.
pub fn validate_description(description: &str) -> Result<(), String> {
    let config = crate::config::get_config();
    if description.chars().count() > config.api.description_max_length {
        return Err(format!(
            "Description length must not exceed {} characters",
            config.api.description_max_length
        ));
    }
    Ok(())
}

/// Build a JSON response with the standard envelope.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// Build an error response from a TaskhubError (maps HTTP status and ErrorCode).
pub fn error_from_taskhub(err: &TaskhubError) -> HttpResponse {
    let status = err.http_status();
    let error_code = ErrorCode::from(err.clone());
    error_response(status, error_code, err.message())
}
