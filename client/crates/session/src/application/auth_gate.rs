//! Reactive Auth Gate
//!
//! Watches responses from the shared API client. An authorization failure
//! anywhere outside the verification endpoints means the credential is no
//! longer accepted, so the whole session is torn down. Results pass through
//! unchanged and are never retried.

use crate::application::config::SessionConfig;
use crate::domain::value_object::credential::Credential;
use crate::error::ApiError;

/// What the gate needs from the session
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(SessionHandle: Send))]
#[cfg_attr(target_arch = "wasm32", allow(async_fn_in_trait))]
pub trait LocalSessionHandle {
    /// Credential to attach to outgoing requests
    fn current_credential(&self) -> Option<Credential>;

    /// End the session after the server refused the credential
    async fn force_logout(&self);
}

#[cfg(target_arch = "wasm32")]
pub use self::LocalSessionHandle as SessionHandle;

/// Auth gate
pub struct AuthGate<H>
where
    H: SessionHandle,
{
    session: H,
    allow_list: Vec<String>,
}

impl<H> AuthGate<H>
where
    H: SessionHandle + Sync,
{
    pub fn new(session: H, config: &SessionConfig) -> Self {
        Self {
            session,
            allow_list: config.verification_allow_list.clone(),
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        self.session.current_credential()
    }

    /// Paths whose 401s are part of a normal flow (email verification)
    pub fn is_exempt(&self, path: &str) -> bool {
        self.allow_list
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }

    pub fn should_force_logout<T>(&self, path: &str, result: &Result<T, ApiError>) -> bool {
        match result {
            Err(e) => e.is_authorization_failure() && !self.is_exempt(path),
            Ok(_) => false,
        }
    }

    /// Inspect one response, logging out on an authorization failure
    pub async fn observe<T>(&self, path: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if self.should_force_logout(path, &result) {
            tracing::warn!(path, "Credential refused, forcing logout");
            self.session.force_logout().await;
        }
        result
    }
}
