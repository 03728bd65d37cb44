//! Task service: request validation and query semantics on top of a [`TaskStore`].
//!
//! Inputs arrive as loosely-typed JSON maps. `None` stands for a request
//! without a usable body (missing, empty, malformed, or not an object).

use crate::error::{TaskError, TaskResult};
use crate::store::TaskStore;
use crate::types::{NewTask, Task, TaskFilter, TaskPatch, TaskSort, TaskStatus, parse_due_date};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Loosely-typed request fields.
pub type Fields = Map<String, Value>;

/// Query parameters accepted by [`TaskService::list`].
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

/// Task operations shared by the JSON API and the web pages.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Validate `fields` and store a new task.
    pub fn create(&self, fields: Option<&Fields>) -> TaskResult<Task> {
        let fields = fields.ok_or_else(|| TaskError::validation("title required"))?;

        let title = match fields.get("title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err(TaskError::validation("title required")),
        };

        let status = match fields.get("status") {
            None => TaskStatus::default(),
            Some(value) => parse_status(value).ok_or_else(|| TaskError::validation("invalid status"))?,
        };

        let due_date = match fields.get("due_date") {
            Some(value) => parse_due_date_field(value)?,
            None => None,
        };

        let description = match fields.get("description") {
            None => Some(String::new()),
            Some(value) => parse_description(value)?,
        };

        let task = self.store.insert(NewTask {
            title,
            description,
            status,
            due_date,
        })?;
        info!(task_id = task.id, status = %task.status, "Task created");
        Ok(task)
    }

    /// List tasks, optionally filtered by status and text and sorted.
    pub fn list(&self, params: &ListParams) -> TaskResult<Vec<Task>> {
        let status = match non_empty(params.status.as_deref()) {
            Some(s) => Some(
                TaskStatus::parse(s)
                    .ok_or_else(|| TaskError::validation("invalid status filter"))?,
            ),
            None => None,
        };

        let filter = TaskFilter {
            status,
            text: non_empty(params.q.as_deref()).map(String::from),
        };
        let sort = TaskSort::from_param(params.sort.as_deref());

        let tasks = self.store.query(&filter, sort)?;
        debug!(count = tasks.len(), ?filter, ?sort, "Listed tasks");
        Ok(tasks)
    }

    pub fn get(&self, id: i64) -> TaskResult<Task> {
        self.store.get(id)?.ok_or(TaskError::NotFound(id))
    }

    /// Apply the fields present in `fields` to an existing task.
    ///
    /// A missing id is reported before the payload is looked at. Every field is
    /// validated before anything is written.
    pub fn update(&self, id: i64, fields: Option<&Fields>) -> TaskResult<Task> {
        if self.store.get(id)?.is_none() {
            return Err(TaskError::NotFound(id));
        }

        let fields = match fields {
            Some(f) if !f.is_empty() => f,
            _ => return Err(TaskError::validation("no data")),
        };

        let mut patch = TaskPatch::default();

        if let Some(value) = fields.get("title") {
            match value {
                Value::String(s) if !s.trim().is_empty() => {
                    patch.title = Some(s.trim().to_string());
                }
                _ => return Err(TaskError::validation("title cannot be empty")),
            }
        }

        if let Some(value) = fields.get("description") {
            patch.description = Some(parse_description(value)?);
        }

        if let Some(value) = fields.get("status") {
            patch.status =
                Some(parse_status(value).ok_or_else(|| TaskError::validation("invalid status"))?);
        }

        if let Some(value) = fields.get("due_date") {
            patch.due_date = Some(parse_due_date_field(value)?);
        }

        // Unknown keys only: nothing to write, but the task still exists
        if patch.is_empty() {
            return self.get(id);
        }

        let task = self.store.update(id, &patch)?.ok_or(TaskError::NotFound(id))?;
        info!(task_id = id, "Task updated");
        Ok(task)
    }

    pub fn delete(&self, id: i64) -> TaskResult<()> {
        if !self.store.delete(id)? {
            return Err(TaskError::NotFound(id));
        }
        info!(task_id = id, "Task deleted");
        Ok(())
    }

    /// Set the task's status to `done`.
    pub fn mark_done(&self, id: i64) -> TaskResult<Task> {
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        let task = self.store.update(id, &patch)?.ok_or(TaskError::NotFound(id))?;
        info!(task_id = id, "Task marked done");
        Ok(task)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn parse_status(value: &Value) -> Option<TaskStatus> {
    value.as_str().and_then(TaskStatus::parse)
}

fn parse_description(value: &Value) -> TaskResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(TaskError::validation("invalid description")),
    }
}

/// Falsy values clear the due date; anything else must be a `YYYY-MM-DD` string.
fn parse_due_date_field(value: &Value) -> TaskResult<Option<chrono::NaiveDate>> {
    if is_falsy(value) {
        return Ok(None);
    }
    value
        .as_str()
        .and_then(parse_due_date)
        .map(Some)
        .ok_or_else(|| TaskError::validation("invalid due_date"))
}

/// JSON values that count as "empty": null, false, zero, "", [] and {}.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
