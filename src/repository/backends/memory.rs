//! In-memory repository backend.
//!
//! Keeps every task in a process-local map. Used by the test suites and for
//! ephemeral deployments where durability is not required.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;

use crate::errors::Result;
use crate::repository::models::{
    NewTask, Priority, PriorityCounts, StatusCounts, Task, TaskFilter, TaskPatch, TaskStatistics,
    TaskStatus,
};
use crate::repository::TaskRepository;

pub struct MemoryRepository {
    tasks: RwLock<HashMap<i64, Task>>,
    next_id: AtomicI64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn matches(task: &Task, filter: &TaskFilter) -> bool {
        if let Some(status) = filter.status
            && task.status != status
        {
            return false;
        }

        if let Some(priority) = filter.priority
            && task.priority != priority
        {
            return false;
        }

        if let Some(ref search) = filter.search {
            let needle = search.to_lowercase();
            let title_matches = task.title.to_lowercase().contains(&needle);
            let description_matches = task
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !title_matches && !description_matches {
                return false;
            }
        }

        true
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TaskRepository for MemoryRepository {
    async fn create(&self, task: NewTask) -> Result<Task> {
        let now = Utc::now();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let task = Task {
            id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: TaskStatus::Pending,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };

        self.tasks.write().insert(id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: i64) -> Option<Task> {
        self.tasks.read().get(&id).cloned()
    }

    async fn list(&self, filter: &TaskFilter) -> Result<(Vec<Task>, usize)> {
        let tasks = self.tasks.read();
        let mut matched: Vec<Task> = tasks
            .values()
            .filter(|task| Self::matches(task, filter))
            .cloned()
            .collect();

        // Newest first, id as tiebreak for tasks created in the same instant
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matched.len();
        let page: Vec<Task> = matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();

        Ok((page, total))
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write();
        let Some(task) = tasks.get_mut(&id) else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(task.clone()));
        }

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn remove(&self, id: i64) -> Result<bool> {
        Ok(self.tasks.write().remove(&id).is_some())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.tasks.read().len())
    }

    async fn statistics(&self) -> Result<TaskStatistics> {
        let tasks = self.tasks.read();
        let mut by_status = StatusCounts::default();
        let mut by_priority = PriorityCounts::default();

        for task in tasks.values() {
            match task.status {
                TaskStatus::Pending => by_status.pending += 1,
                TaskStatus::InProgress => by_status.in_progress += 1,
                TaskStatus::Completed => by_status.completed += 1,
            }
            match task.priority {
                Priority::Low => by_priority.low += 1,
                Priority::Medium => by_priority.medium += 1,
                Priority::High => by_priority.high += 1,
            }
        }

        Ok(TaskStatistics {
            total_tasks: tasks.len(),
            by_status,
            by_priority,
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
