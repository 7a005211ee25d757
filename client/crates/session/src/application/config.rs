//! Application Configuration
//!
//! Configuration for the session application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use reqwest::Url;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::error::{SessionError, SessionResult};

/// Durable and tab-scoped storage key names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Durable: serialized profile
    pub profile: String,
    /// Durable: serialized role
    pub role: String,
    /// Durable: mirror of the credential cookie
    pub token: String,
    /// Tab-scoped: address awaiting email verification
    pub verify_email: String,
    /// Tab-scoped: role awaiting email verification
    pub verify_role: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            profile: "user".to_string(),
            role: "userType".to_string(),
            token: "authToken".to_string(),
            verify_email: "verify_email".to_string(),
            verify_role: "verify_user_type".to_string(),
        }
    }
}

/// Session application configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Origin of the remote API (`https://api.example.com`)
    pub api_base_url: Url,
    /// Credential cookie name
    pub cookie_name: String,
    /// Credential cookie lifetime after login/signup (7 days)
    pub cookie_ttl: Duration,
    /// Whether to mark the cookie Secure (page served over https)
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Delay between writing a fresh credential and resolving it
    pub settle_delay: Duration,
    /// Per-request timeout on native transports
    pub request_timeout: Duration,
    /// Path fragments whose 401s never force a logout
    pub verification_allow_list: Vec<String>,
    /// Storage key names
    pub keys: StorageKeys,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse("http://localhost:5000").expect("static URL is valid"),
            cookie_name: "authToken".to_string(),
            cookie_ttl: Duration::from_secs(7 * 24 * 3600), // 7 days
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            settle_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(15),
            verification_allow_list: vec![
                "/verify".to_string(),
                "/resend-verification".to_string(),
            ],
            keys: StorageKeys::default(),
        }
    }
}

impl SessionConfig {
    /// Config for an API at `base_url`, Secure cookie iff the page is https
    pub fn for_origin(base_url: &str, page_is_secure: bool) -> SessionResult<Self> {
        let api_base_url = Url::parse(base_url)
            .map_err(|e| SessionError::Config(format!("Invalid API base URL {base_url:?}: {e}")))?;
        if api_base_url.cannot_be_a_base() {
            return Err(SessionError::Config(format!(
                "API base URL {base_url:?} cannot be a base"
            )));
        }
        Ok(Self {
            api_base_url,
            cookie_secure: page_is_secure,
            ..Self::default()
        })
    }

    /// Config for local development (plain http, insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::default()
        }
    }

    /// Cookie attributes used when writing the credential
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.cookie_ttl.as_secs() as i64),
        }
    }

    /// Absolute URL of an API path
    pub fn endpoint(&self, path: &str) -> SessionResult<Url> {
        self.api_base_url
            .join(path)
            .map_err(|e| SessionError::Config(format!("Invalid API path {path:?}: {e}")))
    }
}
