//! Management API handlers: share links, products, RFQ inbox.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access::level::AccessLevel;
use crate::access::tokens;
use crate::errors::AppError;
use crate::models::product::{CreateProductRequest, FieldPermissions, ProductResponse};
use crate::models::rfq::RfqRow;
use crate::models::token::{CreateLinkRequest, IssuedLink, LinkMeta, LinkUsage};
use crate::AppState;

#[derive(Deserialize)]
pub struct ProductFilter {
    pub product_id: Uuid,
}

#[derive(Deserialize)]
pub struct OrgFilter {
    pub org_id: Uuid,
}

// ── Share links ──────────────────────────────────────────────

/// POST /api/v1/links — issue a share link.
/// The response is the only place the plaintext secret ever appears.
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<IssuedLink>), AppError> {
    // The product must exist and belong to the org the caller claims.
    let product = state
        .db
        .get_product(payload.product_id)
        .await?
        .ok_or(AppError::ProductNotFound)?;
    if product.org_id != payload.org_id {
        return Err(AppError::ProductNotFound);
    }

    if payload.expires_in_days.is_none() && state.config.default_link_ttl_days > 0 {
        payload.expires_in_days = Some(state.config.default_link_ttl_days);
    }

    let issued = tokens::issue_link(&state.db, &state.config.public_base_url, &payload).await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

/// GET /api/v1/links?product_id= — link metadata, never secrets or hashes.
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductFilter>,
) -> Result<Json<Vec<LinkMeta>>, AppError> {
    let rows = state.db.list_tokens_for_product(params.product_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|r| LinkMeta {
                token_id: r.id,
                product_id: r.product_id,
                channel_id: r.channel_id,
                channel_name: r.channel_name,
                access_level: AccessLevel::parse_or_public(&r.access_level),
                is_revoked: r.is_revoked,
                expires_at: r.expires_at,
                use_count: r.use_count,
                created_at: r.created_at,
            })
            .collect(),
    ))
}

/// DELETE /api/v1/links/:id — revoke. Logical delete only.
pub async fn revoke_link(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let revoked = state.db.revoke_token(id).await?;
    if !revoked {
        return Err(AppError::LinkNotFound);
    }
    tracing::info!(token_id = %id, "share link revoked");
    Ok(Json(json!({ "token_id": id, "revoked": true })))
}

/// GET /api/v1/links/:id/usage
pub async fn get_link_usage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<LinkUsage>, AppError> {
    let row = state.db.get_token(id).await?.ok_or(AppError::LinkNotFound)?;
    Ok(Json(LinkUsage {
        token_id: row.id,
        use_count: row.use_count,
        first_used_at: row.first_used_at,
        last_used_at: row.last_used_at,
    }))
}

// ── Products ─────────────────────────────────────────────────

/// POST /api/v1/products — create a product with a validated permission map.
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let perms_json = payload.field_permissions.unwrap_or_else(|| json!({}));
    let perms = FieldPermissions::from_json_strict(&perms_json)
        .map_err(AppError::InvalidFieldPermissions)?;

    let id = state
        .db
        .insert_product(payload.org_id, &payload.name, &payload.product_data, &perms_json)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            id,
            org_id: payload.org_id,
            name: payload.name,
            product_data: payload.product_data,
            field_permissions: perms,
        }),
    ))
}

/// GET /api/v1/products?org_id=
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OrgFilter>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let rows = state.db.list_products(params.org_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|r| ProductResponse {
                id: r.id,
                org_id: r.org_id,
                name: r.name,
                field_permissions: FieldPermissions::from_json_lenient(&r.field_permissions),
                product_data: r.product_data,
            })
            .collect(),
    ))
}

/// GET /api/v1/products/:id — unfiltered view for the dashboard.
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let row = state.db.get_product(id).await?.ok_or(AppError::ProductNotFound)?;
    Ok(Json(ProductResponse {
        id: row.id,
        org_id: row.org_id,
        name: row.name,
        field_permissions: FieldPermissions::from_json_lenient(&row.field_permissions),
        product_data: row.product_data,
    }))
}

/// PUT /api/v1/products/:id/permissions — replace the permission map.
/// Strict validation here is what keeps the read path's lenient fallback
/// from ever mattering in practice.
pub async fn update_permissions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    FieldPermissions::from_json_strict(&payload).map_err(AppError::InvalidFieldPermissions)?;

    let updated = state.db.update_field_permissions(id, &payload).await?;
    if !updated {
        return Err(AppError::ProductNotFound);
    }
    Ok(Json(json!({ "product_id": id, "updated": true })))
}

// ── RFQs ─────────────────────────────────────────────────────

/// GET /api/v1/rfqs?product_id=
pub async fn list_rfqs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductFilter>,
) -> Result<Json<Vec<RfqRow>>, AppError> {
    let rows = state.db.list_rfqs_for_product(params.product_id).await?;
    Ok(Json(rows))
}
