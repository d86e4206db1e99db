use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{normalize_email, LoginForm, RegisterForm},
        extractors::{SessionContext, LOGIN_PATH},
        services,
    },
    csrf::CsrfToken,
    error::AppError,
    sessions::services::{self as session_svc, clear_session_cookie, session_cookie},
    state::AppState,
    validation::{FieldErrors, FORM},
    views,
};

const HOME_PATH: &str = "/todos";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/register", get(register_page).post(register))
        .route("/auth/logout", post(logout))
}

#[instrument(skip_all)]
pub async fn login_page(session: SessionContext, Extension(csrf): Extension<CsrfToken>) -> Response {
    if session.is_authenticated() {
        return views::redirect(HOME_PATH);
    }
    views::login_page(&csrf.0, "", &FieldErrors::new()).into_response()
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    Extension(csrf): Extension<CsrfToken>,
    Form(form): Form<LoginForm>,
) -> Response {
    match services::authenticate(&state, &form).await {
        Ok(user) => start_session(&state, &session, user.id).await,
        Err(err) => match form_errors(err) {
            Ok(errors) => (
                StatusCode::BAD_REQUEST,
                views::login_page(&csrf.0, &normalize_email(&form.email), &errors),
            )
                .into_response(),
            Err(res) => res,
        },
    }
}

#[instrument(skip_all)]
pub async fn register_page(
    session: SessionContext,
    Extension(csrf): Extension<CsrfToken>,
) -> Response {
    if session.is_authenticated() {
        return views::redirect(HOME_PATH);
    }
    views::register_page(&csrf.0, "", &FieldErrors::new()).into_response()
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: SessionContext,
    Extension(csrf): Extension<CsrfToken>,
    Form(form): Form<RegisterForm>,
) -> Response {
    match services::register(&state, &form).await {
        // registration signs the new user in straight away
        Ok(user) => start_session(&state, &session, user.id).await,
        Err(err) => match form_errors(err) {
            Ok(errors) => (
                StatusCode::BAD_REQUEST,
                views::register_page(&csrf.0, &normalize_email(&form.email), &errors),
            )
                .into_response(),
            Err(res) => res,
        },
    }
}

#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: SessionContext) -> Response {
    if let Some(token) = session.token.as_deref() {
        if let Err(e) = session_svc::destroy(&state, token).await {
            error!(error = %e, "failed to delete session");
        }
    }
    if let Some(user_id) = session.user_id {
        info!(%user_id, "user logged out");
    }

    // Always clear the cookie, even if the session row was already gone.
    match clear_session_cookie(&state.config.session) {
        Ok(cookie) => ([(SET_COOKIE, cookie)], views::redirect(LOGIN_PATH)).into_response(),
        Err(e) => AppError::Internal(e.into()).into_response(),
    }
}

/// Replaces any previous session with a fresh one and sends the user home.
async fn start_session(state: &AppState, previous: &SessionContext, user_id: Uuid) -> Response {
    if let Some(old) = previous.token.as_deref() {
        if let Err(e) = session_svc::destroy(state, old).await {
            error!(error = %e, "failed to drop previous session");
        }
    }
    let token = match session_svc::create(state, user_id).await {
        Ok(token) => token,
        Err(e) => return AppError::Internal(e).into_response(),
    };
    match session_cookie(&state.config.session, &token) {
        Ok(cookie) => ([(SET_COOKIE, cookie)], views::redirect(HOME_PATH)).into_response(),
        Err(e) => AppError::Internal(e.into()).into_response(),
    }
}

/// Errors the user can fix become inline messages; everything else is a response.
fn form_errors(err: AppError) -> Result<FieldErrors, Response> {
    match err {
        AppError::Validation(errors) => Ok(errors),
        AppError::Conflict => Ok(FieldErrors::single(
            "email",
            "This email address is already registered",
        )),
        AppError::Authentication => Ok(FieldErrors::single(FORM, "Invalid email or password")),
        other => Err(other.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_fixable_errors_become_field_messages() {
        let errors = form_errors(AppError::Conflict).unwrap();
        assert_eq!(errors.get("email").len(), 1);

        let errors = form_errors(AppError::Authentication).unwrap();
        assert_eq!(errors.get(FORM), ["Invalid email or password".to_string()]);
    }

    #[test]
    fn infrastructure_errors_are_not_rendered_inline() {
        let res = form_errors(AppError::Internal(anyhow::anyhow!("db down"))).unwrap_err();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
