//! Double-submit CSRF protection.
//!
//! Every client holds a random token in the `_csrf` cookie. Unsafe requests
//! must echo it back in the `csrf_token` form field; the comparison happens
//! before the session is loaded or any handler runs.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::SET_COOKIE, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::{cookies, sessions::services::generate_token, state::AppState, views};

pub const CSRF_COOKIE: &str = "_csrf";
pub const CSRF_FIELD: &str = "csrf_token";
const CSRF_MAX_AGE: i64 = 24 * 60 * 60;
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Token for the current client, embedded in every rendered form.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

pub async fn protect(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let existing = cookies::read(req.headers(), CSRF_COOKIE);
    let is_safe = [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE].contains(req.method());

    let mut req = if is_safe {
        req
    } else {
        match check_form_token(req, existing.as_deref()).await {
            Ok(req) => req,
            Err(rejection) => return rejection,
        }
    };

    let token = match existing {
        Some(token) => token,
        None => match generate_token() {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "csrf token generation failed");
                return reject(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.");
            }
        },
    };
    req.extensions_mut().insert(CsrfToken(token.clone()));

    // Re-sent on every response so the expiry slides with activity.
    let mut res = next.run(req).await;
    match cookies::build(CSRF_COOKIE, &token, CSRF_MAX_AGE, st.config.session.cookie_secure) {
        Ok(cookie) => {
            res.headers_mut().append(SET_COOKIE, cookie);
        }
        Err(e) => error!(error = %e, "csrf cookie rejected"),
    }
    res
}

/// Buffers the urlencoded body, compares its token with the cookie and
/// hands back an equivalent request.
async fn check_form_token(req: Request, cookie: Option<&str>) -> Result<Request, Response> {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES).await.map_err(|e| {
        warn!(error = %e, "form body rejected");
        reject(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.")
    })?;

    let submitted = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_FIELD)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    let Some(submitted) = submitted else {
        warn!(path = %parts.uri.path(), "missing csrf token");
        return Err(reject(StatusCode::BAD_REQUEST, "Missing CSRF token."));
    };
    match cookie {
        Some(expected) if constant_time_eq(expected.as_bytes(), submitted.as_bytes()) => {
            Ok(Request::from_parts(parts, Body::from(bytes)))
        }
        _ => {
            warn!(path = %parts.uri.path(), "invalid csrf token");
            Err(reject(StatusCode::FORBIDDEN, "Invalid CSRF token."))
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, views::error_page(status, message)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_plain_equality() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
