//! HTML templates for the web pages.
//!
//! Templates are embedded at compile time using `include_str!`. Placeholders
//! of the form `{{name}}` are substituted by the page handlers.

/// The home page.
pub const HOME_TEMPLATE: &str = include_str!("templates/home.html");

/// The task list page with status filter.
pub const TASKS_TEMPLATE: &str = include_str!("templates/tasks.html");
