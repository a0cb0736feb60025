use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error_response;
use crate::logging::TraceId;
use crate::state::AppState;

/// Custom header name for application identification.
static RP_APP_ID_HEADER: HeaderName = HeaderName::from_static("rp-app-id");

/// Middleware that validates the `rp-app-id` request header.
///
/// When `require_app_id` is `true` in config, requests without a valid
/// `rp-app-id` header are rejected with 403 Forbidden.
/// When `require_app_id` is `false`, the middleware passes through all requests.
pub async fn app_id_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.app_id.require_app_id {
        return next.run(req).await;
    }

    let trace_id = req
        .extensions()
        .get::<TraceId>()
        .map(|t| t.0.clone())
        .unwrap_or_default();

    let app_id = req
        .headers()
        .get(&RP_APP_ID_HEADER)
        .and_then(|v| v.to_str().ok());

    match app_id {
        None | Some("") => {
            tracing::warn!(
                trace_id = %trace_id,
                "Request rejected: missing or empty rp-app-id header"
            );
            error_response(
                StatusCode::FORBIDDEN,
                &trace_id,
                "app_id_missing",
                "missing rp-app-id header",
            )
        }
        Some(id) => {
            // Empty allowlist accepts any non-empty value.
            if !state.config.app_id.allowed_app_ids.is_empty()
                && !state.config.app_id.allowed_app_ids.iter().any(|a| a == id)
            {
                tracing::warn!(
                    trace_id = %trace_id,
                    app_id = %id,
                    "Request rejected: invalid rp-app-id"
                );
                return error_response(
                    StatusCode::FORBIDDEN,
                    &trace_id,
                    "app_id_invalid",
                    "invalid rp-app-id",
                );
            }
            next.run(req).await
        }
    }
}
