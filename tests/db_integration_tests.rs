//! Integration tests for the SQLite task store.
//!
//! Most tests use an in-memory database; the persistence tests use a
//! temporary file.

use task_tracker::db::Database;
use task_tracker::store::TaskStore;
use task_tracker::types::{NewTask, TaskFilter, TaskPatch, TaskSort, TaskStatus, parse_due_date};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: Some(String::new()),
        status: TaskStatus::Todo,
        due_date: None,
    }
}

mod insert_tests {
    use super::*;

    #[test]
    fn insert_assigns_increasing_ids() {
        let db = setup_db();

        let a = db.insert(new_task("a")).expect("insert a");
        let b = db.insert(new_task("b")).expect("insert b");

        assert!(a.id > 0);
        assert!(b.id > a.id);
    }

    #[test]
    fn insert_round_trips_all_fields() {
        let db = setup_db();

        let created = db
            .insert(NewTask {
                title: "Write report".to_string(),
                description: None,
                status: TaskStatus::InProgress,
                due_date: parse_due_date("2024-03-15"),
            })
            .expect("insert");

        let fetched = db.get(created.id).expect("get").expect("task exists");
        assert_eq!(fetched, created);
        assert_eq!(fetched.description, None);
        assert_eq!(fetched.status, TaskStatus::InProgress);
        assert_eq!(fetched.due_date, parse_due_date("2024-03-15"));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let db = setup_db();

        let a = db.insert(new_task("a")).unwrap();
        assert!(db.delete(a.id).unwrap());
        let b = db.insert(new_task("b")).unwrap();

        assert!(b.id > a.id);
    }
}

mod query_tests {
    use super::*;

    fn ids(tasks: &[task_tracker::types::Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn default_order_is_newest_first() {
        let db = setup_db();
        let a = db.insert(new_task("a")).unwrap();
        let b = db.insert(new_task("b")).unwrap();
        let c = db.insert(new_task("c")).unwrap();

        let tasks = db
            .query(&TaskFilter::default(), TaskSort::CreatedDesc)
            .unwrap();
        assert_eq!(ids(&tasks), vec![c.id, b.id, a.id]);
    }

    #[test]
    fn due_date_order_puts_nulls_last() {
        let db = setup_db();
        let undated = db.insert(new_task("undated")).unwrap();
        let mut later = new_task("later");
        later.due_date = parse_due_date("2024-11-05");
        let later = db.insert(later).unwrap();
        let mut sooner = new_task("sooner");
        sooner.due_date = parse_due_date("2024-02-01");
        let sooner = db.insert(sooner).unwrap();

        let tasks = db
            .query(&TaskFilter::default(), TaskSort::DueDateAsc)
            .unwrap();
        assert_eq!(ids(&tasks), vec![sooner.id, later.id, undated.id]);
    }

    #[test]
    fn status_filter_is_exact() {
        let db = setup_db();
        let mut done = new_task("done");
        done.status = TaskStatus::Done;
        let done = db.insert(done).unwrap();
        db.insert(new_task("todo")).unwrap();

        let filter = TaskFilter {
            status: Some(TaskStatus::Done),
            text: None,
        };
        let tasks = db.query(&filter, TaskSort::CreatedDesc).unwrap();
        assert_eq!(ids(&tasks), vec![done.id]);
    }

    #[test]
    fn text_filter_searches_title_and_description() {
        let db = setup_db();
        let title_hit = db.insert(new_task("Fix FOO bug")).unwrap();
        let mut desc_hit = new_task("other");
        desc_hit.description = Some("mentions foo".to_string());
        let desc_hit = db.insert(desc_hit).unwrap();
        let mut null_desc = new_task("nothing");
        null_desc.description = None;
        db.insert(null_desc).unwrap();

        let filter = TaskFilter {
            status: None,
            text: Some("foo".to_string()),
        };
        let tasks = db.query(&filter, TaskSort::CreatedDesc).unwrap();
        assert_eq!(ids(&tasks), vec![desc_hit.id, title_hit.id]);
    }

    #[test]
    fn text_filter_treats_wildcards_literally() {
        let db = setup_db();
        let hit = db.insert(new_task("100% done")).unwrap();
        db.insert(new_task("100 done")).unwrap();
        db.insert(new_task("a_b")).unwrap();

        let filter = TaskFilter {
            status: None,
            text: Some("0%".to_string()),
        };
        let tasks = db.query(&filter, TaskSort::CreatedDesc).unwrap();
        assert_eq!(ids(&tasks), vec![hit.id]);

        let underscore = TaskFilter {
            status: None,
            text: Some("_".to_string()),
        };
        assert_eq!(db.query(&underscore, TaskSort::CreatedDesc).unwrap().len(), 1);
    }

    #[test]
    fn filters_compose() {
        let db = setup_db();
        let mut hit = new_task("foo");
        hit.status = TaskStatus::Done;
        let hit = db.insert(hit).unwrap();
        db.insert(new_task("foo")).unwrap();
        let mut miss = new_task("bar");
        miss.status = TaskStatus::Done;
        db.insert(miss).unwrap();

        let filter = TaskFilter {
            status: Some(TaskStatus::Done),
            text: Some("foo".to_string()),
        };
        let tasks = db.query(&filter, TaskSort::DueDateAsc).unwrap();
        assert_eq!(ids(&tasks), vec![hit.id]);
    }
}

mod update_tests {
    use super::*;

    #[test]
    fn update_changes_only_patched_fields() {
        let db = setup_db();
        let mut task = new_task("original");
        task.description = Some("keep me".to_string());
        task.due_date = parse_due_date("2024-03-15");
        let task = db.insert(task).unwrap();

        let patch = TaskPatch {
            title: Some("renamed".to_string()),
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        let updated = db.update(task.id, &patch).unwrap().expect("task exists");

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.due_date, task.due_date);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[test]
    fn update_clears_nullable_fields() {
        let db = setup_db();
        let mut task = new_task("t");
        task.description = Some("text".to_string());
        task.due_date = parse_due_date("2024-03-15");
        let task = db.insert(task).unwrap();

        let patch = TaskPatch {
            description: Some(None),
            due_date: Some(None),
            ..Default::default()
        };
        let updated = db.update(task.id, &patch).unwrap().unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.due_date, None);
    }

    #[test]
    fn update_missing_task_returns_none() {
        let db = setup_db();
        let patch = TaskPatch {
            title: Some("x".to_string()),
            ..Default::default()
        };
        assert!(db.update(404, &patch).unwrap().is_none());
    }

    #[test]
    fn empty_patch_returns_current_task() {
        let db = setup_db();
        let task = db.insert(new_task("same")).unwrap();
        let same = db.update(task.id, &TaskPatch::default()).unwrap();
        assert_eq!(same, Some(task));
    }
}

mod delete_tests {
    use super::*;

    #[test]
    fn delete_twice() {
        let db = setup_db();
        let task = db.insert(new_task("gone")).unwrap();

        assert!(db.delete(task.id).unwrap());
        assert!(!db.delete(task.id).unwrap());
        assert!(db.get(task.id).unwrap().is_none());
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn tasks_survive_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tasks.db");

        let id = {
            let db = Database::open(&path).expect("open");
            let mut task = new_task("persisted");
            task.due_date = parse_due_date("2025-01-31");
            db.insert(task).unwrap().id
        };

        let db = Database::open(&path).expect("reopen");
        let task = db.get(id).unwrap().expect("task persisted");
        assert_eq!(task.title, "persisted");
        assert_eq!(task.due_date, parse_due_date("2025-01-31"));
    }

    #[test]
    fn schema_rejects_blank_titles() {
        let db = setup_db();
        let result = db.insert(new_task("   "));
        assert!(result.is_err());
    }
}
