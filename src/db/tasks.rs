//! Task CRUD against the `tasks` table.

use super::{Database, now_us};
use crate::store::TaskStore;
use crate::types::{DATE_FORMAT, NewTask, Task, TaskFilter, TaskPatch, TaskSort, TaskStatus};
use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};

const SELECT_TASK: &str =
    "SELECT id, title, description, status, created_at, due_date FROM tasks";

fn order_clause(sort: TaskSort) -> &'static str {
    match sort {
        TaskSort::CreatedDesc => " ORDER BY created_at DESC, id DESC",
        // ISO dates compare correctly as text
        TaskSort::DueDateAsc => " ORDER BY due_date IS NULL, due_date ASC, id ASC",
    }
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let id: i64 = row.get("id")?;
    let title: String = row.get("title")?;
    let description: Option<String> = row.get("description")?;
    let status: TaskStatus = row.get("status")?;
    let created_at_us: i64 = row.get("created_at")?;
    let due_date: Option<String> = row.get("due_date")?;

    let created_at = DateTime::from_timestamp_micros(created_at_us).ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(4, created_at_us)
    })?;
    let due_date = match due_date {
        Some(s) => Some(NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(Task {
        id,
        title,
        description,
        status,
        created_at,
        due_date,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_TASK))?;
    let task = stmt.query_row(params![task_id], parse_task_row).optional()?;
    Ok(task)
}

impl TaskStore for Database {
    fn insert(&self, task: NewTask) -> Result<Task> {
        let now = now_us();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, description, status, created_at, due_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    task.title,
                    task.description,
                    task.status,
                    now,
                    format_date(task.due_date),
                ],
            )?;
            let id = conn.last_insert_rowid();

            get_task_internal(conn, id)?
                .ok_or_else(|| anyhow!("task {} vanished after insert", id))
        })
    }

    fn get(&self, id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, id))
    }

    fn query(&self, filter: &TaskFilter, sort: TaskSort) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut sql = format!("{} WHERE 1=1", SELECT_TASK);
            let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
            let mut param_idx = 1;

            if let Some(status) = filter.status {
                sql.push_str(&format!(" AND status = ?{}", param_idx));
                params_vec.push(Box::new(status));
                param_idx += 1;
            }

            // instr() instead of LIKE so '%' and '_' in the query are literal
            if let Some(ref text) = filter.text {
                sql.push_str(&format!(
                    " AND (instr(lower(title), lower(?{0})) > 0
                       OR instr(lower(COALESCE(description, '')), lower(?{0})) > 0)",
                    param_idx
                ));
                params_vec.push(Box::new(text.clone()));
            }

            sql.push_str(order_clause(sort));

            let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params_refs.as_slice(), parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    fn update(&self, id: i64, patch: &TaskPatch) -> Result<Option<Task>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if get_task_internal(&tx, id)?.is_none() {
                return Ok(None);
            }

            let mut sets: Vec<String> = Vec::new();
            let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(ref title) = patch.title {
                params_vec.push(Box::new(title.clone()));
                sets.push(format!("title = ?{}", params_vec.len()));
            }
            if let Some(ref description) = patch.description {
                params_vec.push(Box::new(description.clone()));
                sets.push(format!("description = ?{}", params_vec.len()));
            }
            if let Some(status) = patch.status {
                params_vec.push(Box::new(status));
                sets.push(format!("status = ?{}", params_vec.len()));
            }
            if let Some(due_date) = patch.due_date {
                params_vec.push(Box::new(format_date(due_date)));
                sets.push(format!("due_date = ?{}", params_vec.len()));
            }

            if !sets.is_empty() {
                params_vec.push(Box::new(id));
                let sql = format!(
                    "UPDATE tasks SET {} WHERE id = ?{}",
                    sets.join(", "),
                    params_vec.len()
                );
                let params_refs: Vec<&dyn ToSql> =
                    params_vec.iter().map(|p| p.as_ref()).collect();
                tx.execute(&sql, params_refs.as_slice())?;
            }

            let task = get_task_internal(&tx, id)?;
            tx.commit()?;
            Ok(task)
        })
    }

    fn delete(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }
}
