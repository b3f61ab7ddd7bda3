//! RFQ (Request for Quotation) DTOs.
//!
//! Submitting an RFQ is the event that upgrades a buyer to `after_rfq`
//! access: the handler records the inquiry and mints a fresh max-tier link
//! bound to the product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SubmitRfqRequest {
    pub company: String,
    pub contact_email: String,
    pub message: Option<String>,
    pub quantity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitRfqResponse {
    pub rfq_id: Uuid,
    /// Max-tier share URL for the same product, minted for this buyer.
    pub access_url: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RfqRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub org_id: Uuid,
    pub company: String,
    pub contact_email: String,
    pub message: Option<String>,
    pub quantity: Option<String>,
    pub created_at: DateTime<Utc>,
}
