//! Task API CRUD handlers.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{error, info, trace};

use crate::repository::models::{NewTask, TaskFilter, TaskPatch};
use crate::repository::TaskRepository;

use super::error_code::ErrorCode;
use super::helpers::{
    created_response, error_from_taskhub, error_response, parse_due_date, success_response,
    validate_description, validate_title,
};
use super::types::{GetTasksQuery, PostNewTask, TaskListResponse, TaskResponse, UpdateTaskPayload};

/// List tasks with optional filtering and pagination.
pub async fn get_all_tasks(
    query: web::Query<GetTasksQuery>,
    repo: web::Data<Arc<dyn TaskRepository>>,
) -> ActixResult<impl Responder> {
    trace!("Task API: request to list tasks with filters: {:?}", query);

    let config = crate::config::get_config();
    let limit = query
        .limit
        .unwrap_or(config.api.default_page_limit)
        .clamp(1, config.api.max_page_limit);
    let offset = query.offset.unwrap_or(0);

    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        search: query.search.clone().filter(|s| !s.is_empty()),
        limit,
        offset,
    };

    match repo.list(&filter).await {
        Ok((tasks, total)) => {
            info!(
                "Task API: returning {} tasks (offset {}, total: {})",
                tasks.len(),
                offset,
                total
            );
            Ok(success_response(TaskListResponse {
                total,
                tasks: tasks.into_iter().map(TaskResponse::from).collect(),
            }))
        }
        Err(e) => {
            error!("Task API: failed to list tasks: {}", e);
            Ok(error_from_taskhub(&e))
        }
    }
}

/// Create a new task.
pub async fn post_task(
    payload: web::Json<PostNewTask>,
    repo: web::Data<Arc<dyn TaskRepository>>,
) -> ActixResult<impl Responder> {
    info!("Task API: create task request - title: {}", payload.title);

    if let Err(message) = validate_title(&payload.title) {
        error!("Task API: invalid title - {}", message);
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::TaskInvalidTitle,
            &message,
        ));
    }

    if let Some(ref description) = payload.description
        && let Err(message) = validate_description(description)
    {
        error!("Task API: invalid description - {}", message);
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::TaskInvalidDescription,
            &message,
        ));
    }

    let due_date = match payload.due_date.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match parse_due_date(raw) {
            Ok(date) => Some(date),
            Err(message) => {
                error!("Task API: {}", message);
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::TaskInvalidDueDate,
                    &message,
                ));
            }
        },
        None => None,
    };

    let new_task = NewTask {
        title: payload.title.clone(),
        description: payload.description.clone().filter(|s| !s.is_empty()),
        priority: payload.priority.unwrap_or_default(),
        due_date,
    };

    match repo.create(new_task).await {
        Ok(task) => {
            info!("Task API: task created - id: {}", task.id);
            Ok(created_response(TaskResponse::from(task)))
        }
        Err(e) => {
            error!("Task API: failed to create task: {}", e);
            Ok(error_from_taskhub(&e))
        }
    }
}

/// Get a single task by id.
pub async fn get_task(
    id: web::Path<i64>,
    repo: web::Data<Arc<dyn TaskRepository>>,
) -> ActixResult<impl Responder> {
    let id = id.into_inner();
    trace!("Task API: get task request - id: {}", id);

    match repo.get(id).await {
        Some(task) => Ok(success_response(TaskResponse::from(task))),
        None => {
            info!("Task API: task not found - {}", id);
            Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::TaskNotFound,
                &format!("Task with ID {} not found", id),
            ))
        }
    }
}

/// Update an existing task. Only provided fields change.
pub async fn update_task(
    id: web::Path<i64>,
    payload: web::Json<UpdateTaskPayload>,
    repo: web::Data<Arc<dyn TaskRepository>>,
) -> ActixResult<impl Responder> {
    let id = id.into_inner();
    info!("Task API: update task request - id: {}", id);

    if let Some(ref title) = payload.title
        && let Err(message) = validate_title(title)
    {
        error!("Task API: invalid title - {}", message);
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::TaskInvalidTitle,
            &message,
        ));
    }

    if let Some(ref description) = payload.description
        && let Err(message) = validate_description(description)
    {
        error!("Task API: invalid description - {}", message);
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::TaskInvalidDescription,
            &message,
        ));
    }

    let due_date = match payload.due_date.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match parse_due_date(raw) {
            Ok(date) => Some(date),
            Err(message) => {
                error!("Task API: {}", message);
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::TaskInvalidDueDate,
                    &message,
                ));
            }
        },
        None => None,
    };

    let patch = TaskPatch {
        title: payload.title.clone(),
        description: payload.description.clone(),
        priority: payload.priority,
        status: payload.status,
        due_date,
    };

    match repo.update(id, patch).await {
        Ok(Some(task)) => {
            info!("Task API: task updated - {}", id);
            Ok(success_response(TaskResponse::from(task)))
        }
        Ok(None) => {
            info!("Task API: attempt to update nonexistent task - {}", id);
            Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::TaskNotFound,
                &format!("Task with ID {} not found", id),
            ))
        }
        Err(e) => {
            error!("Task API: failed to update task {}: {}", id, e);
            Ok(error_from_taskhub(&e))
        }
    }
}

/// Delete a task by id.
pub async fn delete_task(
    id: web::Path<i64>,
    repo: web::Data<Arc<dyn TaskRepository>>,
) -> ActixResult<impl Responder> {
    let id = id.into_inner();
    info!("Task API: delete task request - id: {}", id);

    match repo.remove(id).await {
        Ok(true) => {
            info!("Task API: task deleted - {}", id);
            Ok(HttpResponse::NoContent().finish())
        }
        Ok(false) => {
            info!("Task API: attempt to delete nonexistent task - {}", id);
            Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::TaskNotFound,
                &format!("Task with ID {} not found", id),
            ))
        }
        Err(e) => {
            error!("Task API: failed to delete task {}: {}", id, e);
            Ok(error_from_taskhub(&e))
        }
    }
}

/// Task statistics: counts by status and by priority.
pub async fn get_statistics(
    repo: web::Data<Arc<dyn TaskRepository>>,
) -> ActixResult<impl Responder> {
    trace!("Task API: statistics request");

    match repo.statistics().await {
        Ok(stats) => Ok(success_response(stats)),
        Err(e) => {
            error!("Task API: failed to compute statistics: {}", e);
            Ok(error_from_taskhub(&e))
        }
    }
}

/// Task management routes `/tasks`
pub fn task_routes() -> actix_web::Scope {
    web::scope("/tasks")
        .route("", web::get().to(get_all_tasks))
        .route("", web::head().to(get_all_tasks))
        .route("", web::post().to(post_task))
        .route("/{id}", web::get().to(get_task))
        .route("/{id}", web::head().to(get_task))
        .route("/{id}", web::put().to(update_task))
        .route("/{id}", web::delete().to(delete_task))
}

/// Statistics routes `/stats`
pub fn stats_routes() -> actix_web::Scope {
    web::scope("/stats")
        .route("", web::get().to(get_statistics))
        .route("", web::head().to(get_statistics))
}
