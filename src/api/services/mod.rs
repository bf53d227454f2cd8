pub mod error_code;
pub mod health;
pub mod helpers;
pub mod metrics;
pub mod tasks;
pub mod types;

pub use error_code::ErrorCode;
pub use health::{HealthService, health_routes};
pub use metrics::{MetricsService, metrics_routes};
pub use tasks::{stats_routes, task_routes};
pub use types::{
    ApiResponse, GetTasksQuery, HealthResponse, PostNewTask, TaskListResponse, TaskResponse,
    UpdateTaskPayload,
};
