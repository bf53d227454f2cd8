use std::sync::Arc;

use tracing::error;

use crate::errors::{Result, TaskhubError};

pub mod backends;
pub mod models;

pub use models::{
    NewTask, Priority, PriorityCounts, StatusCounts, Task, TaskFilter, TaskPatch, TaskStatistics,
    TaskStatus,
};

/// Task persistence interface.
///
/// Implementations must be safe to share across request handlers.
#[async_trait::async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: NewTask) -> Result<Task>;
    async fn get(&self, id: i64) -> Option<Task>;
    /// Returns the matching page plus the total match count before paging.
    async fn list(&self, filter: &TaskFilter) -> Result<(Vec<Task>, usize)>;
    /// Returns `None` when no task with `id` exists.
    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Option<Task>>;
    /// Returns `false` when no task with `id` exists.
    async fn remove(&self, id: i64) -> Result<bool>;
    async fn count(&self) -> Result<usize>;
    async fn statistics(&self) -> Result<TaskStatistics>;
    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn create() -> Result<Arc<dyn TaskRepository>> {
        let config = crate::config::get_config();
        let backend = &config.database.backend;

        match backend.as_str() {
            "sqlite" => {
                let repository =
                    backends::sqlite::SqliteRepository::new(&config.database.database_url)?;
                Ok(Arc::new(repository) as Arc<dyn TaskRepository>)
            }
            "memory" => Ok(Arc::new(backends::memory::MemoryRepository::new())
                as Arc<dyn TaskRepository>),
            _ => {
                error!("Unknown repository backend: {}", backend);
                Err(TaskhubError::repository_backend_not_found(format!(
                    "Unknown repository backend: {}. Supported: sqlite, memory",
                    backend
                )))
            }
        }
    }
}
