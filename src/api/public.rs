//! Buyer-facing handlers: the filtered product page and RFQ submission.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::filter::filter_fields;
use crate::access::resolver::{resolve_access, AccessVia};
use crate::access::tokens;
use crate::errors::AppError;
use crate::models::product::{FieldPermissions, ProductPageResponse};
use crate::models::rfq::{SubmitRfqRequest, SubmitRfqResponse};
use crate::models::token::CreateLinkRequest;
use crate::AppState;

#[derive(Deserialize)]
pub struct ViewParams {
    pub token: Option<String>,
}

/// GET /p/:product_id?token=… — the shared product page.
///
/// A bad token is not an error: resolution falls through to public and the
/// page renders with locked fields.
pub async fn view_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Query(params): Query<ViewParams>,
    headers: axum::http::HeaderMap,
) -> Result<Json<ProductPageResponse>, AppError> {
    let product = state
        .db
        .get_product(product_id)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    let merchant_key = merchant_key_from(&headers);
    let resolved = resolve_access(
        &state.db,
        product.id,
        product.org_id,
        params.token.as_deref(),
        merchant_key,
    )
    .await;

    match &resolved.via {
        AccessVia::Token(t) => {
            tracing::debug!(product_id = %product.id, token_id = %t.token_id, level = %resolved.level, "page view via token");
        }
        AccessVia::Merchant { org_id } => {
            tracing::debug!(product_id = %product.id, %org_id, "page view via merchant key");
        }
        AccessVia::Public => {
            tracing::debug!(product_id = %product.id, "public page view");
        }
    }

    let perms = FieldPermissions::from_json_lenient(&product.field_permissions);
    let filtered = filter_fields(&product.product_data, &perms, resolved.level);

    Ok(Json(ProductPageResponse {
        id: product.id,
        name: product.name,
        access_level: resolved.level,
        product_data: filtered,
    }))
}

/// POST /p/:product_id/rfq — record a buyer inquiry and mint the max-tier
/// link that implements the RFQ access upgrade.
pub async fn submit_rfq(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<SubmitRfqRequest>,
) -> Result<(StatusCode, Json<SubmitRfqResponse>), AppError> {
    let product = state
        .db
        .get_product(product_id)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    let rfq_id = state
        .db
        .insert_rfq(
            product.id,
            product.org_id,
            &payload.company,
            &payload.contact_email,
            payload.message.as_deref(),
            payload.quantity.as_deref(),
        )
        .await?;

    tracing::info!(%rfq_id, product_id = %product.id, company = %payload.company, "RFQ submitted");

    // The upgrade link is attributed to the reserved "rfq" channel.
    let link_req = CreateLinkRequest {
        product_id: product.id,
        org_id: product.org_id,
        channel_id: Uuid::nil(),
        channel_name: "rfq".to_string(),
        access_level: "after_rfq".to_string(),
        expires_in_days: None,
        created_by: Some(payload.contact_email.clone()),
        notes: Some(format!("auto-issued for RFQ {rfq_id}")),
    };
    let issued = tokens::issue_link(&state.db, &state.config.public_base_url, &link_req).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitRfqResponse {
            rfq_id,
            access_url: issued.url,
        }),
    ))
}

/// Extract the merchant key from `X-Merchant-Key` or `Authorization: Bearer`.
fn merchant_key_from(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("x-merchant-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim())
        })
}
