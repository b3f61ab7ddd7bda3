use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Build a store whose pool connects on first use. Router tests use this
    /// to exercise routes that reject before any query runs.
    pub fn connect_lazy(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- Organization Operations --

    pub async fn create_org(&self, name: &str) -> anyhow::Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO organizations (name) VALUES ($1) RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Resolve a hashed merchant key to its org. Inactive keys never match.
    pub async fn org_for_merchant_key_hash(&self, key_hash: &str) -> anyhow::Result<Option<Uuid>> {
        let org_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT org_id FROM merchant_keys WHERE key_hash = $1 AND is_active = true",
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(org_id)
    }

    pub async fn insert_merchant_key(&self, org_id: Uuid, key_hash: &str) -> anyhow::Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO merchant_keys (org_id, key_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(org_id)
        .bind(key_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    // -- Product Operations --

    pub async fn insert_product(
        &self,
        org_id: Uuid,
        name: &str,
        product_data: &Value,
        field_permissions: &Value,
    ) -> anyhow::Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO products (org_id, name, product_data, field_permissions)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(org_id)
        .bind(name)
        .bind(product_data)
        .bind(field_permissions)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn get_product(&self, product_id: Uuid) -> anyhow::Result<Option<ProductRow>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, org_id, name, product_data, field_permissions, created_at FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_products(&self, org_id: Uuid) -> anyhow::Result<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, org_id, name, product_data, field_permissions, created_at FROM products WHERE org_id = $1 ORDER BY created_at DESC",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Replace a product's field permission map. The caller validates the
    /// map first; this only writes.
    pub async fn update_field_permissions(
        &self,
        product_id: Uuid,
        field_permissions: &Value,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE products SET field_permissions = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(field_permissions)
        .bind(product_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- Access Token Operations --

    pub async fn insert_access_token(&self, token: &NewAccessToken<'_>) -> anyhow::Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO access_tokens
                 (product_id, org_id, channel_id, channel_name, access_level,
                  token_hash, expires_at, created_by, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING id"#,
        )
        .bind(token.product_id)
        .bind(token.org_id)
        .bind(token.channel_id)
        .bind(token.channel_name)
        .bind(token.access_level)
        .bind(token.token_hash)
        .bind(token.expires_at)
        .bind(token.created_by)
        .bind(token.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn find_token_by_hash(
        &self,
        token_hash: &str,
    ) -> anyhow::Result<Option<AccessTokenRow>> {
        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"SELECT id, product_id, org_id, channel_id, channel_name, access_level,
                      is_revoked, expires_at, use_count, first_used_at, last_used_at,
                      created_by, notes, created_at
               FROM access_tokens WHERE token_hash = $1"#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_token(&self, token_id: Uuid) -> anyhow::Result<Option<AccessTokenRow>> {
        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"SELECT id, product_id, org_id, channel_id, channel_name, access_level,
                      is_revoked, expires_at, use_count, first_used_at, last_used_at,
                      created_by, notes, created_at
               FROM access_tokens WHERE id = $1"#,
        )
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_tokens_for_product(
        &self,
        product_id: Uuid,
    ) -> anyhow::Result<Vec<AccessTokenRow>> {
        let rows = sqlx::query_as::<_, AccessTokenRow>(
            r#"SELECT id, product_id, org_id, channel_id, channel_name, access_level,
                      is_revoked, expires_at, use_count, first_used_at, last_used_at,
                      created_by, notes, created_at
               FROM access_tokens WHERE product_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Logical delete only: tokens are never removed, revocation is a flag.
    pub async fn revoke_token(&self, token_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE access_tokens SET is_revoked = true, updated_at = NOW() WHERE id = $1",
        )
        .bind(token_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Usage counters for one successful validation. Single-row UPDATE; the
    /// validator detaches this and never blocks on it.
    pub async fn record_token_use(&self, token_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE access_tokens
               SET use_count = use_count + 1,
                   first_used_at = COALESCE(first_used_at, NOW()),
                   last_used_at = NOW()
               WHERE id = $1"#,
        )
        .bind(token_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Count tokens whose expiry passed within the last sweep window.
    /// Used by the hourly job for operational visibility only.
    pub async fn count_newly_expired_tokens(&self, since_hours: i32) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM access_tokens
               WHERE is_revoked = false
                 AND expires_at IS NOT NULL
                 AND expires_at < NOW()
                 AND expires_at > NOW() - ($1 || ' hours')::interval"#,
        )
        .bind(since_hours.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // -- RFQ Operations --

    pub async fn insert_rfq(
        &self,
        product_id: Uuid,
        org_id: Uuid,
        company: &str,
        contact_email: &str,
        message: Option<&str>,
        quantity: Option<&str>,
    ) -> anyhow::Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO rfqs (product_id, org_id, company, contact_email, message, quantity)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(product_id)
        .bind(org_id)
        .bind(company)
        .bind(contact_email)
        .bind(message)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn list_rfqs_for_product(
        &self,
        product_id: Uuid,
    ) -> anyhow::Result<Vec<crate::models::rfq::RfqRow>> {
        let rows = sqlx::query_as::<_, crate::models::rfq::RfqRow>(
            r#"SELECT id, product_id, org_id, company, contact_email, message, quantity, created_at
               FROM rfqs WHERE product_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// ── Row types ────────────────────────────────────────────────

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub product_data: Value,
    pub field_permissions: Value,
    pub created_at: DateTime<Utc>,
}

/// Stored access token. `access_level` stays a string here; conversion to the
/// typed enum (lenient, fail-closed) happens in the validator.
#[derive(Debug, sqlx::FromRow)]
pub struct AccessTokenRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub org_id: Uuid,
    pub channel_id: Uuid,
    pub channel_name: String,
    pub access_level: String,
    pub is_revoked: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub use_count: i64,
    pub first_used_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a new token. The plaintext secret never reaches this
/// layer — only its hash.
#[derive(Debug)]
pub struct NewAccessToken<'a> {
    pub product_id: Uuid,
    pub org_id: Uuid,
    pub channel_id: Uuid,
    pub channel_name: &'a str,
    pub access_level: &'a str,
    pub token_hash: &'a str,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Option<&'a str>,
    pub notes: Option<&'a str>,
}
