use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitchivo::access::level::AccessLevel;
use pitchivo::access::{secret, tokens};
use pitchivo::models::token::CreateLinkRequest;
use pitchivo::store::postgres::PgStore;
use pitchivo::{api, config, jobs, AppState};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "pitchivo=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            // --port beats PITCHIVO_PORT; neither set falls back to the default.
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::Link { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            handle_link_command(command, &db, &cfg).await
        }
        Some(cli::Commands::Org { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            handle_org_command(command, &db).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let state = Arc::new(AppState {
        db: db.clone(),
        config: cfg.clone(),
    });

    let app = api::app_router(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer({
            use axum::http::{HeaderName, Method};
            use tower_http::cors::AllowOrigin;
            let dashboard_origin = cfg.dashboard_origin.clone();
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str == dashboard_origin
                        || origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                // NOTE: Cannot use AllowHeaders::any() with allow_credentials(true) per CORS spec
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static("authorization"),
                    HeaderName::from_static("x-admin-key"),
                    HeaderName::from_static("x-merchant-key"),
                    HeaderName::from_static("x-request-id"),
                ])
                .allow_credentials(true)
        })
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware));

    // Hourly operational sweep over expired links
    jobs::expiry::spawn(db);
    tracing::info!("Background expiry sweep started (hourly)");

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Pitchivo access service listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows clients to correlate errors with server logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: injects security headers into every response.
/// These protect against XSS, clickjacking, MIME sniffing, and info leakage.
async fn security_headers_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    // Prevent MIME-type sniffing (e.g., interpreting a .txt as HTML)
    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());

    // Prevent clickjacking by disallowing iframe embedding
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());

    // Prevent the browser from caching responses that may carry one-time secrets
    headers.insert("Cache-Control", "no-store".parse().unwrap());

    // Strip Referrer to avoid leaking ?token= URLs to third parties
    headers.insert("Referrer-Policy", "no-referrer".parse().unwrap());

    // Remove server identity header
    headers.remove("Server");

    resp
}

async fn handle_link_command(
    cmd: cli::LinkCommands,
    db: &PgStore,
    cfg: &config::Config,
) -> anyhow::Result<()> {
    match cmd {
        cli::LinkCommands::Create {
            product_id,
            org_id,
            channel_id,
            channel_name,
            access_level,
            expires_in_days,
            notes,
        } => {
            let req = CreateLinkRequest {
                product_id: product_id.parse().context("Invalid product_id")?,
                org_id: org_id.parse().context("Invalid org_id")?,
                channel_id: channel_id.parse().context("Invalid channel_id")?,
                channel_name,
                access_level,
                expires_in_days,
                created_by: Some("cli".to_string()),
                notes,
            };

            let issued = tokens::issue_link(db, &cfg.public_base_url, &req)
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;

            println!("Share link created (the URL below is shown ONCE):");
            println!("  Token ID: {}", issued.token_id);
            println!("  Level:    {}", issued.access_level);
            match issued.expires_at {
                Some(at) => println!("  Expires:  {}", at.format("%Y-%m-%d %H:%M UTC")),
                None => println!("  Expires:  never"),
            }
            println!("  URL:      {}", issued.url);
        }
        cli::LinkCommands::List { product_id } => {
            let pid = product_id.parse().context("Invalid product_id")?;
            let links = db.list_tokens_for_product(pid).await?;
            if links.is_empty() {
                println!("No links found.");
            } else {
                println!(
                    "{:<38} {:<20} {:<12} {:<8} USES",
                    "TOKEN ID", "CHANNEL", "LEVEL", "REVOKED"
                );
                for l in links {
                    println!(
                        "{:<38} {:<20} {:<12} {:<8} {}",
                        l.id,
                        l.channel_name,
                        AccessLevel::parse_or_public(&l.access_level),
                        l.is_revoked,
                        l.use_count
                    );
                }
            }
        }
        cli::LinkCommands::Revoke { token_id } => {
            let id = token_id.parse().context("Invalid token_id")?;
            let revoked = db.revoke_token(id).await?;
            if revoked {
                println!("Link revoked.");
            } else {
                println!("Link not found.");
            }
        }
    }
    Ok(())
}

async fn handle_org_command(cmd: cli::OrgCommands, db: &PgStore) -> anyhow::Result<()> {
    match cmd {
        cli::OrgCommands::Create { name } => {
            let id = db.create_org(&name).await?;
            println!("Organization created:");
            println!("  Name: {}", name);
            println!("  ID:   {}", id);
        }
        cli::OrgCommands::IssueKey { org_id } => {
            let org = org_id.parse().context("Invalid org_id")?;

            // Same hash-only persistence as share links: the plaintext key
            // is printed once and never stored.
            let key = secret::generate_secret();
            let key_id = db.insert_merchant_key(org, &secret::hash_secret(&key)).await?;

            println!("Merchant key issued (the key below is shown ONCE):");
            println!("  Key ID: {}", key_id);
            println!("  Key:    {}", key);
            println!("  Use:    X-Merchant-Key: {}", key);
        }
    }
    Ok(())
}
