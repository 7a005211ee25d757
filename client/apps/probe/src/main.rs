//! Session Probe Entry Point
//!
//! Runs the client session manager natively against a deployed API: stores
//! a credential, bootstraps, resolves the role and optionally calls one
//! gated endpoint and logs out. Uses `anyhow` for startup errors, but
//! session errors are reported through `kernel::error::AppError`.

use std::env;
use std::sync::Arc;

use platform::jar::MemoryCookieJar;
use platform::storage::MemoryStore;
use session::{
    ApiClient, AppError, Credential, CredentialStore, ErrorKind, HttpProfileGateway, OptionExt,
    ResultExt, SessionConfig, SessionCoordinator, SessionPhase,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "probe=info,session=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let config = SessionConfig::for_origin(&base_url, base_url.starts_with("https://"))
        .map_app_err(ErrorKind::BadRequest, "API_BASE_URL is not a usable origin")?;

    let credential = env::var("AUTH_TOKEN")
        .ok()
        .and_then(Credential::parse)
        .ok_or_unauthorized("AUTH_TOKEN must be set to a usable credential")?;

    // The browser substrates, in memory
    let store = CredentialStore::new(
        Arc::new(MemoryCookieJar::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        &config,
    );
    let gateway = Arc::new(HttpProfileGateway::new(&config)?);
    let session = SessionCoordinator::new(gateway, store, config.clone());

    session.store().write(&credential)?;
    let initial = session.bootstrap();
    tracing::info!(api = %config.api_base_url, phase = ?initial.phase(), "Bootstrapped");

    let state = match session.refresh().await {
        Ok(state) => state,
        Err(e) => {
            e.log();
            return Err(AppError::from(e).into());
        }
    };

    match state.phase() {
        SessionPhase::Authenticated(role) => {
            let fields = state.profile().map(|p| p.as_map().len()).unwrap_or(0);
            tracing::info!(role = %role, fields, "Credential accepted");
        }
        phase => {
            tracing::warn!(?phase, "Credential rejected");
            return Ok(());
        }
    }

    if let Ok(path) = env::var("PROBE_PATH") {
        let client = ApiClient::new(&config, session.clone())?;
        match client.get_json::<serde_json::Value>(&path).await {
            Ok(body) => {
                let body = serde_json::to_string_pretty(&body).map_err(AppError::from)?;
                tracing::info!(path = %path, body = %body, "Gated request succeeded");
            }
            Err(e) => {
                let app = AppError::from(e);
                tracing::warn!(
                    path = %path,
                    status = app.status_code(),
                    recovery = ?app.recovery(),
                    error = %app,
                    "Gated request failed"
                );
            }
        }
        tracing::info!(phase = ?session.state().phase(), "Session after gated request");
    }

    let logout = env::var("PROBE_LOGOUT")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    if logout {
        session.logout().await;
        tracing::info!(phase = ?session.state().phase(), "Session after logout");
    }

    Ok(())
}
