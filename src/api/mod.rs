use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use subtle::ConstantTimeEq;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod handlers;
pub mod public;

/// Assemble the full application: health probes, the buyer-facing product
/// page routes, and the management API under `/api/v1`.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }))
        .merge(public_router())
        .nest("/api/v1", api_router(state.clone()))
        .with_state(state)
}

/// Build the management API router.
/// All routes are relative — the caller mounts this under `/api/v1`.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/links", get(handlers::list_links).post(handlers::create_link))
        .route("/links/:id", delete(handlers::revoke_link))
        .route("/links/:id/usage", get(handlers::get_link_usage))
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/:id", get(handlers::get_product))
        .route(
            "/products/:id/permissions",
            put(handlers::update_permissions),
        )
        .route("/rfqs", get(handlers::list_rfqs))
        .layer(middleware::from_fn_with_state(state, admin_auth))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

/// Buyer-facing routes: the product page and RFQ submission. No auth layer —
/// access is decided per request by the resolver.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/p/:product_id", get(public::view_product))
        .route("/p/:product_id/rfq", post(public::submit_rfq))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: validates `X-Admin-Key` against the configured admin key using
/// a constant-time comparison. Falls back to `Authorization: Bearer`.
async fn admin_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided_key = req
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim())
        });

    match provided_key {
        Some(k) if bool::from(k.as_bytes().ct_eq(state.config.admin_key.as_bytes())) => {
            Ok(next.run(req).await)
        }
        Some(k) => {
            // Never log the expected key or the full provided key.
            let masked = if k.len() > 8 {
                format!("{}…{}", &k[..4], &k[k.len() - 4..])
            } else {
                "****".to_string()
            };
            tracing::warn!("management API: invalid key (provided: '{}')", masked);
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("management API: missing X-Admin-Key header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
