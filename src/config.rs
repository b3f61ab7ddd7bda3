use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Key for the management API (`X-Admin-Key`).
    pub admin_key: String,
    /// Base URL prefixed to generated share links, e.g. `https://app.pitchivo.com`.
    pub public_base_url: String,
    /// Default expiry applied when a link request omits `expires_in_days`.
    /// 0 = links never expire by default. Set via PITCHIVO_DEFAULT_LINK_TTL_DAYS.
    pub default_link_ttl_days: i64,
    /// Allowed CORS origin for the supplier dashboard.
    pub dashboard_origin: String,
}

const PLACEHOLDER_ADMIN_KEY: &str = "CHANGE_ME_ADMIN_KEY";

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let admin_key =
        std::env::var("PITCHIVO_ADMIN_KEY").unwrap_or_else(|_| PLACEHOLDER_ADMIN_KEY.into());

    if admin_key == PLACEHOLDER_ADMIN_KEY {
        let env_mode = std::env::var("PITCHIVO_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "PITCHIVO_ADMIN_KEY is still the insecure placeholder. \
                 Set a proper key before running in production."
            );
        }
        eprintln!("⚠️  PITCHIVO_ADMIN_KEY is not set — using insecure placeholder. Set a real key for production.");
    }

    let public_base_url = std::env::var("PITCHIVO_PUBLIC_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8080".into());
    // Reject unparseable base URLs early rather than minting broken links.
    url::Url::parse(&public_base_url)
        .map_err(|e| anyhow::anyhow!("invalid PITCHIVO_PUBLIC_BASE_URL: {e}"))?;

    Ok(Config {
        port: std::env::var("PITCHIVO_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/pitchivo".into()),
        admin_key,
        public_base_url,
        default_link_ttl_days: std::env::var("PITCHIVO_DEFAULT_LINK_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        dashboard_origin: std::env::var("DASHBOARD_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".into()),
    })
}
