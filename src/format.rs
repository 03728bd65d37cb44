//! JSON and HTML rendering of tasks.

use crate::types::{DATE_FORMAT, Task};
use chrono::SecondsFormat;
use serde::Serialize;

/// Wire representation of a task.
#[derive(Debug, Serialize)]
pub struct TaskJson<'a> {
    pub id: i64,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: &'static str,
    pub created_at: String,
    pub due_date: Option<String>,
}

/// Convert a task into its JSON shape.
pub fn task_json(task: &Task) -> TaskJson<'_> {
    TaskJson {
        id: task.id,
        title: &task.title,
        description: task.description.as_deref(),
        status: task.status.as_str(),
        created_at: task
            .created_at
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        due_date: format_due_date(task),
    }
}

pub fn format_due_date(task: &Task) -> Option<String> {
    task.due_date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskStatus, parse_due_date};
    use chrono::{TimeZone, Utc};

    fn sample() -> Task {
        Task {
            id: 3,
            title: "Buy milk".to_string(),
            description: None,
            status: TaskStatus::InProgress,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            due_date: parse_due_date("2024-03-15"),
        }
    }

    #[test]
    fn task_json_shape() {
        let json = serde_json::to_value(task_json(&sample())).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["title"], "Buy milk");
        assert!(json["description"].is_null());
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["created_at"], "2024-03-01T09:30:00.000000Z");
        assert_eq!(json["due_date"], "2024-03-15");
    }

    #[test]
    fn missing_due_date_is_null() {
        let mut task = sample();
        task.due_date = None;
        let json = serde_json::to_value(task_json(&task)).unwrap();
        assert!(json["due_date"].is_null());
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}
