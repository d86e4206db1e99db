use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        extractors::{require_auth, CurrentUser},
        services::find_user,
    },
    csrf::CsrfToken,
    error::AppError,
    state::AppState,
    views,
};

use super::{dto::CreateTodoForm, services};

/// Every route here sits behind the auth gate.
pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id/toggle", post(toggle_todo))
        .route("/todos/:id/delete", post(delete_todo))
        .route_layer(middleware::from_fn(require_auth))
}

#[instrument(skip(state, csrf))]
pub async fn list_todos(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Extension(csrf): Extension<CsrfToken>,
) -> Result<Response, AppError> {
    let user = find_user(&state, user_id).await?;
    let todos = services::list(&state).await?;
    Ok(views::todo_index(user.as_ref().map(|u| u.email.as_str()), &todos, &csrf.0).into_response())
}

#[instrument(skip(state, csrf, form))]
pub async fn create_todo(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Extension(csrf): Extension<CsrfToken>,
    Form(form): Form<CreateTodoForm>,
) -> Result<Response, AppError> {
    match services::create(&state, &form.title).await? {
        Some(todo) => Ok(views::todo_item(&todo, &csrf.0).into_response()),
        None => Ok(views::redirect("/todos")),
    }
}

#[instrument(skip(state, csrf))]
pub async fn toggle_todo(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Extension(csrf): Extension<CsrfToken>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let todo = services::toggle(&state, id).await?;
    Ok(views::todo_item(&todo, &csrf.0).into_response())
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete(&state, id).await?;
    Ok(StatusCode::OK)
}
