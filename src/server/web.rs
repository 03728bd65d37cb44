//! Server-rendered pages.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{error, warn};

use super::TaskServer;
use super::templates;
use crate::error::TaskError;
use crate::format::{format_due_date, html_escape};
use crate::service::ListParams;
use crate::types::{Task, TaskStatus};

/// Query parameters for the task list page.
#[derive(Debug, serde::Deserialize)]
pub(super) struct TasksPageParams {
    status: Option<String>,
}

/// Home page.
pub(super) async fn home_page() -> Html<&'static str> {
    Html(templates::HOME_TEMPLATE)
}

/// Task list page, newest first, optionally filtered by status.
pub(super) async fn tasks_page(
    State(state): State<TaskServer>,
    Query(params): Query<TasksPageParams>,
) -> Response {
    let status_filter = params.status.unwrap_or_default();
    let list_params = ListParams {
        status: Some(status_filter.clone()),
        ..Default::default()
    };

    let (code, tasks, message) = match state.service().list(&list_params) {
        Ok(tasks) => (StatusCode::OK, tasks, String::new()),
        Err(TaskError::Validation(msg)) => (
            StatusCode::BAD_REQUEST,
            Vec::new(),
            format!(
                r#"<div class="message message-error">{}</div>"#,
                html_escape(&msg)
            ),
        ),
        Err(e) => {
            error!("Failed to load tasks page: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Vec::new(),
                r#"<div class="message message-error">Error loading tasks</div>"#.to_string(),
            )
        }
    };

    let html = templates::TASKS_TEMPLATE
        .replace("{{filter_options}}", &render_filter_options(&status_filter))
        .replace("{{message}}", &message)
        .replace("{{count}}", &tasks.len().to_string())
        .replace("{{table}}", &render_task_table(&tasks));

    (code, Html(html)).into_response()
}

/// Mark a task done and go back to the list. A missing task is a hard 404.
pub(super) async fn mark_done_handler(
    State(state): State<TaskServer>,
    Path(task_id): Path<i64>,
) -> Response {
    match state.service().mark_done(task_id) {
        Ok(_) => Redirect::to("/tasks").into_response(),
        Err(TaskError::NotFound(id)) => {
            warn!(task_id = id, "Mark done on missing task");
            (StatusCode::NOT_FOUND, Html("<h1>Not Found</h1>")).into_response()
        }
        Err(e) => {
            error!("Failed to mark task {} done: {}", task_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Internal Server Error</h1>"),
            )
                .into_response()
        }
    }
}

fn render_filter_options(selected: &str) -> String {
    let mut html = format!(
        r#"<option value=""{}>All</option>"#,
        if selected.is_empty() { " selected" } else { "" }
    );
    for status in TaskStatus::ALL {
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            status.as_str(),
            if selected == status.as_str() { " selected" } else { "" },
            status.label()
        ));
    }
    html
}

fn render_task_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return r#"<div class="empty-state">No tasks found</div>"#.to_string();
    }

    let mut html = String::from(
        "<table><thead><tr><th>Title</th><th>Description</th><th>Status</th>\
         <th>Due</th><th>Created</th><th></th></tr></thead><tbody>",
    );

    for task in tasks {
        let action = if task.status == TaskStatus::Done {
            String::new()
        } else {
            format!(
                r#"<form method="post" action="/tasks/{}/mark-done"><button type="submit">Mark done</button></form>"#,
                task.id
            )
        };

        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td><span class="badge badge-{}">{}</span></td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
            html_escape(&task.title),
            html_escape(task.description.as_deref().unwrap_or("")),
            task.status.as_str(),
            task.status.label(),
            format_due_date(task).unwrap_or_else(|| "-".to_string()),
            task.created_at.format("%Y-%m-%d %H:%M"),
            action
        ));
    }

    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn filter_options_mark_selection() {
        let html = render_filter_options("done");
        assert!(html.contains(r#"<option value="done" selected>Done</option>"#));
        assert!(html.contains(r#"<option value="">All</option>"#));
    }

    #[test]
    fn table_escapes_titles_and_hides_button_for_done() {
        let task = Task {
            id: 5,
            title: "<script>".to_string(),
            description: None,
            status: TaskStatus::Done,
            created_at: Utc::now(),
            due_date: None,
        };
        let html = render_task_table(&[task]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("mark-done"));
    }
}
