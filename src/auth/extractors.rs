use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    cookies,
    error::AppError,
    sessions::{self, SESSION_COOKIE},
    state::AppState,
    views,
};

pub const LOGIN_PATH: &str = "/auth/login";

/// Who is calling, as resolved once per request by [`load_session`].
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Raw cookie value, present even when it no longer resolves.
    pub token: Option<String>,
    pub user_id: Option<Uuid>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Resolves the session cookie and stores a [`SessionContext`] on the request.
pub async fn load_session(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = cookies::read(req.headers(), SESSION_COOKIE);
    let user_id = match token.as_deref() {
        Some(token) => match sessions::services::resolve(&st, token).await {
            Ok(user_id) => user_id,
            Err(e) => {
                error!(error = %e, "session lookup failed");
                return AppError::Internal(e).into_response();
            }
        },
        None => None,
    };
    debug!(authenticated = user_id.is_some(), "session loaded");
    req.extensions_mut().insert(SessionContext { token, user_id });
    next.run(req).await
}

/// Guard for protected routes: anonymous callers go to the login page.
pub async fn require_auth(req: Request, next: Next) -> Response {
    let signed_in = req
        .extensions()
        .get::<SessionContext>()
        .is_some_and(SessionContext::is_authenticated);
    if !signed_in {
        debug!(path = %req.uri().path(), "anonymous request redirected to login");
        return views::redirect(LOGIN_PATH);
    }
    next.run(req).await
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Identity of the signed-in user.
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .and_then(|ctx| ctx.user_id)
            .map(CurrentUser)
            .ok_or_else(|| views::redirect(LOGIN_PATH))
    }
}
