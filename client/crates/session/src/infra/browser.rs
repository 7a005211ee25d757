//! Browser Wiring
//!
//! Assembles a coordinator over `document.cookie`, `localStorage`,
//! `sessionStorage` and the fetch-backed gateway of the current page.

use std::sync::Arc;

use platform::jar::DocumentCookieJar;
use platform::storage::{BrowserLocalStore, BrowserSessionStore};

use crate::application::config::SessionConfig;
use crate::application::coordinator::SessionCoordinator;
use crate::application::credential_store::CredentialStore;
use crate::error::SessionResult;
use crate::infra::http::HttpProfileGateway;

/// Session of the current page against the API at `base_url`
///
/// The credential cookie is marked `Secure` when the page itself was served
/// over https.
pub fn browser_session(base_url: &str) -> SessionResult<SessionCoordinator<HttpProfileGateway>> {
    let config = SessionConfig::for_origin(base_url, platform::runtime::page_is_secure())?;
    let store = CredentialStore::new(
        Arc::new(DocumentCookieJar),
        Arc::new(BrowserLocalStore),
        Arc::new(BrowserSessionStore),
        &config,
    );
    let gateway = Arc::new(HttpProfileGateway::new(&config)?);
    tracing::debug!(api = %config.api_base_url, secure = config.cookie_secure, "Browser session created");
    Ok(SessionCoordinator::new(gateway, store, config))
}
