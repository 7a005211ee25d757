//! Client Session Module
//!
//! Clean Architecture structure:
//! - `domain/` - Value objects, entities, gateway traits
//! - `application/` - Credential store, role resolver, coordinator, auth gate
//! - `infra/` - HTTP gateway and the shared API client
//!
//! ## Session Model
//! - The credential cookie is the only authority for "is there a credential"
//! - The durable mirror is a cache; it is shown early but always re-verified
//! - Roles are resolved by probing the Student then the Institute profile endpoint
//! - A 401 on any gated request outside email verification logs out everywhere

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::auth_gate::{AuthGate, LocalSessionHandle, SessionHandle};
pub use application::config::{SessionConfig, StorageKeys};
pub use application::coordinator::SessionCoordinator;
pub use application::credential_store::{CredentialStore, PendingVerification};
pub use domain::{Credential, Identity, Profile, Role, SessionPhase, SessionState};
pub use error::{ApiError, SessionError, SessionResult};
pub use infra::{api_client::ApiClient, http::HttpProfileGateway};
#[cfg(target_arch = "wasm32")]
pub use infra::browser::browser_session;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::{ErrorKind, Recovery},
};
