//! In-memory task store.

use super::{TaskStore, sort_tasks};
use crate::types::{NewTask, Task, TaskFilter, TaskPatch, TaskSort};
use anyhow::{Result, anyhow};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    tasks: BTreeMap<i64, Task>,
    last_id: i64,
}

/// Task store held entirely in process memory. Ids are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl TaskStore for MemoryStore {
    fn insert(&self, task: NewTask) -> Result<Task> {
        let mut inner = self.lock()?;
        inner.last_id += 1;
        let stored = Task {
            id: inner.last_id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: Utc::now(),
            due_date: task.due_date,
        };
        inner.tasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn get(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.lock()?.tasks.get(&id).cloned())
    }

    fn query(&self, filter: &TaskFilter, sort: TaskSort) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .lock()?
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_tasks(&mut tasks, sort);
        Ok(tasks)
    }

    fn update(&self, id: i64, patch: &TaskPatch) -> Result<Option<Task>> {
        let mut inner = self.lock()?;
        Ok(inner.tasks.get_mut(&id).map(|task| {
            patch.apply(task);
            task.clone()
        }))
    }

    fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.lock()?.tasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskStatus, parse_due_date};

    fn new_task(title: &str, due: Option<&str>) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: Some(String::new()),
            status: TaskStatus::Todo,
            due_date: due.and_then(parse_due_date),
        }
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let a = store.insert(new_task("a", None)).unwrap();
        assert!(store.delete(a.id).unwrap());
        let b = store.insert(new_task("b", None)).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn due_date_sort_puts_undated_last() {
        let store = MemoryStore::new();
        let undated = store.insert(new_task("undated", None)).unwrap();
        let late = store.insert(new_task("late", Some("2024-12-01"))).unwrap();
        let early = store.insert(new_task("early", Some("2024-01-01"))).unwrap();

        let ids: Vec<i64> = store
            .query(&TaskFilter::default(), TaskSort::DueDateAsc)
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![early.id, late.id, undated.id]);
    }

    #[test]
    fn default_sort_is_newest_first() {
        let store = MemoryStore::new();
        let first = store.insert(new_task("first", None)).unwrap();
        let second = store.insert(new_task("second", None)).unwrap();

        let ids: Vec<i64> = store
            .query(&TaskFilter::default(), TaskSort::CreatedDesc)
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn update_missing_returns_none() {
        let store = MemoryStore::new();
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        assert!(store.update(42, &patch).unwrap().is_none());
    }
}
