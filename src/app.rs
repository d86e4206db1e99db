use axum::{middleware, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::extractors::load_session;
use crate::state::AppState;
use crate::{auth, csrf, todos, views};

/// Layers run outside-in: trace, CSRF check, session load, then the route
/// (plus the auth gate on `/todos`).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { views::redirect("/todos") }))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(todos::router())
        .nest_service("/assets", ServeDir::new(&state.config.assets_dir))
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .layer(middleware::from_fn_with_state(state.clone(), csrf::protect))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
        .with_state(state)
}

pub async fn serve(app: Router, state: &AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
