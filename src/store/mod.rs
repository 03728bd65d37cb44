//! Task storage interface.
//!
//! The service layer talks to storage only through [`TaskStore`], so it can be
//! backed by SQLite ([`crate::db::Database`]) or by [`MemoryStore`] in tests.

mod memory;

pub use memory::MemoryStore;

use crate::types::{NewTask, Task, TaskFilter, TaskPatch, TaskSort};
use anyhow::Result;

/// Keyed storage of task records.
///
/// Errors returned from these methods are storage faults; "not found" is
/// reported through `Option`/`bool` instead.
pub trait TaskStore: Send + Sync {
    /// Persist a new task, assigning its id and creation time.
    fn insert(&self, task: NewTask) -> Result<Task>;

    fn get(&self, id: i64) -> Result<Option<Task>>;

    /// All tasks matching `filter`, ordered by `sort`.
    fn query(&self, filter: &TaskFilter, sort: TaskSort) -> Result<Vec<Task>>;

    /// Apply `patch` to the task. Returns `None` if the id does not exist.
    fn update(&self, id: i64, patch: &TaskPatch) -> Result<Option<Task>>;

    /// Remove the task. Returns `false` if the id does not exist.
    fn delete(&self, id: i64) -> Result<bool>;
}

/// Order tasks in place the way [`TaskStore::query`] promises.
pub fn sort_tasks(tasks: &mut [Task], sort: TaskSort) {
    match sort {
        TaskSort::CreatedDesc => {
            tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
        }
        TaskSort::DueDateAsc => tasks.sort_by(|a, b| {
            // None sorts after every date
            let key = |t: &Task| (t.due_date.is_none(), t.due_date);
            key(a).cmp(&key(b)).then(a.id.cmp(&b.id))
        }),
    }
}
