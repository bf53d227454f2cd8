//! SQLite repository backend.
//!
//! Stores tasks in a single `tasks` table with TEXT-encoded enums and
//! timestamps. Queries are composed dynamically from the active filters.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::{error, info};

use crate::errors::{Result, TaskhubError};
use crate::repository::models::{
    NewTask, PriorityCounts, StatusCounts, Task, TaskFilter, TaskPatch, TaskStatistics, TaskStatus,
};
use crate::repository::TaskRepository;

const TASK_COLUMNS: &str =
    "id, title, description, priority, status, due_date, created_at, updated_at";

pub struct SqliteRepository {
    connection: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).map_err(|e| {
            TaskhubError::database_connection(format!(
                "Failed to open database {}: {}",
                db_path, e
            ))
        })?;

        let repository = SqliteRepository {
            connection: Mutex::new(conn),
        };
        repository.init_db()?;

        info!("SqliteRepository initialized, database path: {}", db_path);
        Ok(repository)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connection.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                priority TEXT DEFAULT 'medium',
                status TEXT DEFAULT 'pending',
                due_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        let priority_raw: String = row.get(3)?;
        let status_raw: String = row.get(4)?;
        let due_raw: Option<String> = row.get(5)?;
        let created_raw: String = row.get(6)?;
        let updated_raw: String = row.get(7)?;

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            priority: priority_raw.parse().unwrap_or_default(),
            status: status_raw.parse().unwrap_or_default(),
            due_date: due_raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            created_at: parse_timestamp(&created_raw),
            updated_at: parse_timestamp(&updated_raw),
        })
    }

    fn fetch_task(conn: &Connection, id: i64) -> rusqlite::Result<Option<Task>> {
        conn.query_row(
            &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
            params![id],
            Self::task_from_row,
        )
        .optional()
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait::async_trait]
impl TaskRepository for SqliteRepository {
    async fn create(&self, task: NewTask) -> Result<Task> {
        let now = Utc::now().to_rfc3339();
        let conn = self.connection.lock();

        conn.execute(
            "INSERT INTO tasks (title, description, priority, status, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.title,
                task.description,
                task.priority.to_string(),
                TaskStatus::Pending.to_string(),
                task.due_date.map(|d| d.to_string()),
                now,
                now
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::fetch_task(&conn, id)?.ok_or_else(|| {
            TaskhubError::database_operation(format!("Task {} missing after insert", id))
        })
    }

    async fn get(&self, id: i64) -> Option<Task> {
        let conn = self.connection.lock();
        match Self::fetch_task(&conn, id) {
            Ok(task) => task,
            Err(e) => {
                error!("Failed to read task {}: {}", id, e);
                None
            }
        }
    }

    async fn list(&self, filter: &TaskFilter) -> Result<(Vec<Task>, usize)> {
        let mut query = format!("SELECT {} FROM tasks WHERE 1=1", TASK_COLUMNS);
        let mut count_query = String::from("SELECT COUNT(*) FROM tasks WHERE 1=1");
        let mut filter_params: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            query.push_str(" AND status = ?");
            count_query.push_str(" AND status = ?");
            filter_params.push(status.to_string());
        }

        if let Some(priority) = filter.priority {
            query.push_str(" AND priority = ?");
            count_query.push_str(" AND priority = ?");
            filter_params.push(priority.to_string());
        }

        if let Some(ref search) = filter.search {
            query.push_str(" AND (title LIKE ? OR description LIKE ?)");
            count_query.push_str(" AND (title LIKE ? OR description LIKE ?)");
            let pattern = format!("%{}%", search);
            filter_params.push(pattern.clone());
            filter_params.push(pattern);
        }

        let conn = self.connection.lock();

        let total: i64 = conn.query_row(
            &count_query,
            params_from_iter(filter_params.iter()),
            |row| row.get(0),
        )?;

        // limit/offset are pre-clamped integers, composed directly
        query.push_str(&format!(
            " ORDER BY created_at DESC, id DESC LIMIT {} OFFSET {}",
            filter.limit, filter.offset
        ));

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(filter_params.iter()), Self::task_from_row)?;
        let tasks = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((tasks, total as usize))
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Option<Task>> {
        let conn = self.connection.lock();

        let Some(existing) = Self::fetch_task(&conn, id)? else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(existing));
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(title) = patch.title {
            assignments.push("title = ?");
            values.push(title);
        }
        if let Some(description) = patch.description {
            assignments.push("description = ?");
            values.push(description);
        }
        if let Some(priority) = patch.priority {
            assignments.push("priority = ?");
            values.push(priority.to_string());
        }
        if let Some(status) = patch.status {
            assignments.push("status = ?");
            values.push(status.to_string());
        }
        if let Some(due_date) = patch.due_date {
            assignments.push("due_date = ?");
            values.push(due_date.to_string());
        }
        assignments.push("updated_at = ?");
        values.push(Utc::now().to_rfc3339());

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = {}",
            assignments.join(", "),
            id
        );
        conn.execute(&sql, params_from_iter(values.iter()))?;

        Ok(Self::fetch_task(&conn, id)?)
    }

    async fn remove(&self, id: i64) -> Result<bool> {
        let conn = self.connection.lock();
        let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.connection.lock();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(total as usize)
    }

    async fn statistics(&self) -> Result<TaskStatistics> {
        let conn = self.connection.lock();

        let mut by_status = StatusCounts::default();
        {
            let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (status, count) = row?;
                match status.as_str() {
                    "pending" => by_status.pending = count as usize,
                    "in_progress" => by_status.in_progress = count as usize,
                    "completed" => by_status.completed = count as usize,
                    _ => {}
                }
            }
        }

        let mut by_priority = PriorityCounts::default();
        {
            let mut stmt =
                conn.prepare("SELECT priority, COUNT(*) FROM tasks GROUP BY priority")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (priority, count) = row?;
                match priority.as_str() {
                    "low" => by_priority.low = count as usize,
                    "medium" => by_priority.medium = count as usize,
                    "high" => by_priority.high = count as usize,
                    _ => {}
                }
            }
        }

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;

        Ok(TaskStatistics {
            total_tasks: total as usize,
            by_status,
            by_priority,
        })
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.connection.lock();
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
