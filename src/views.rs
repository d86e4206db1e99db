//! Server-rendered HTML pages and fragments.

use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::{
    todos::repo_types::Todo,
    validation::{FieldErrors, FORM},
};

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/assets/style.css">
<script src="{HTMX_SRC}"></script>
</head><body>
<main class="container">
{body}
</main>
</body></html>"#,
        title = escape(title),
    ))
}

fn csrf_field(csrf: &str) -> String {
    format!(r#"<input type="hidden" name="csrf_token" value="{}">"#, escape(csrf))
}

fn errors_for(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .iter()
        .map(|msg| format!(r#"<p class="error">{}</p>"#, escape(msg)))
        .collect()
}

pub fn login_page(csrf: &str, email: &str, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        r#"<h1>Sign in</h1>
{form_errors}
<form method="post" action="/auth/login">
  {csrf}
  <label>Email <input type="email" name="email" value="{email}" autocomplete="username"></label>
  {email_errors}
  <label>Password <input type="password" name="password" autocomplete="current-password"></label>
  {password_errors}
  <button type="submit">Sign in</button>
</form>
<p>No account yet? <a href="/auth/register">Register</a></p>"#,
        form_errors = errors_for(errors, FORM),
        csrf = csrf_field(csrf),
        email = escape(email),
        email_errors = errors_for(errors, "email"),
        password_errors = errors_for(errors, "password"),
    );
    layout("Sign in", &body)
}

pub fn register_page(csrf: &str, email: &str, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        r#"<h1>Create an account</h1>
{form_errors}
<form method="post" action="/auth/register">
  {csrf}
  <label>Email <input type="email" name="email" value="{email}" autocomplete="username"></label>
  {email_errors}
  <label>Password <input type="password" name="password" autocomplete="new-password"></label>
  {password_errors}
  <label>Confirm password <input type="password" name="confirm_password" autocomplete="new-password"></label>
  {confirm_errors}
  <button type="submit">Register</button>
</form>
<p>Already registered? <a href="/auth/login">Sign in</a></p>"#,
        form_errors = errors_for(errors, FORM),
        csrf = csrf_field(csrf),
        email = escape(email),
        email_errors = errors_for(errors, "email"),
        password_errors = errors_for(errors, "password"),
        confirm_errors = errors_for(errors, "confirm_password"),
    );
    layout("Register", &body)
}

fn item_html(todo: &Todo, csrf: &str) -> String {
    let (state, label) = if todo.completed {
        ("completed", "Undo")
    } else {
        ("active", "Done")
    };
    format!(
        r##"<li id="todo-{id}" class="todo {state}">
  <span class="title">{title}</span>
  <form method="post" action="/todos/{id}/toggle" hx-post="/todos/{id}/toggle" hx-target="#todo-{id}" hx-swap="outerHTML">
    {csrf}<button type="submit">{label}</button>
  </form>
  <form method="post" action="/todos/{id}/delete" hx-post="/todos/{id}/delete" hx-target="#todo-{id}" hx-swap="outerHTML">
    {csrf}<button type="submit">Delete</button>
  </form>
</li>"##,
        id = todo.id,
        title = escape(&todo.title),
        csrf = csrf_field(csrf),
    )
}

/// Single `<li>` swapped in by htmx after create and toggle.
pub fn todo_item(todo: &Todo, csrf: &str) -> Html<String> {
    Html(item_html(todo, csrf))
}

pub fn todo_index(user_email: Option<&str>, todos: &[Todo], csrf: &str) -> Html<String> {
    let items: String = todos.iter().map(|t| item_html(t, csrf)).collect();
    let who = user_email
        .map(|e| format!(r#"<span class="who">Signed in as {}</span>"#, escape(e)))
        .unwrap_or_default();
    let body = format!(
        r##"<header>
  <h1>Todos</h1>
  {who}
  <form method="post" action="/auth/logout">{csrf}<button type="submit">Sign out</button></form>
</header>
<form method="post" action="/todos" hx-post="/todos" hx-target="#todo-list" hx-swap="beforeend">
  {csrf}
  <input type="text" name="title" placeholder="What needs doing?" autofocus>
  <button type="submit">Add</button>
</form>
<ul id="todo-list">
{items}
</ul>"##,
        csrf = csrf_field(csrf),
    );
    layout("Todos", &body)
}

/// `302 Found` to a fixed in-app path.
pub fn redirect(to: &'static str) -> Response {
    (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static(to))]).into_response()
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let body = format!(
        r#"<h1>{code}</h1>
<p>{message}</p>
<p><a href="/todos">Back to the list</a></p>"#,
        code = status.as_u16(),
        message = escape(message),
    );
    layout(status.canonical_reason().unwrap_or("Error"), &body)
}
