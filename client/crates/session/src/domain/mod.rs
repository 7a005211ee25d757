//! Domain Layer
//!
//! Contains entities, value objects, and gateway traits.

pub mod entity;
pub mod gateway;
pub mod value_object;

// Re-exports
pub use entity::{
    profile::{Identity, Profile},
    session_state::{SessionPhase, SessionState},
};
pub use gateway::{LocalProfileGateway, ProfileGateway};
pub use value_object::{credential::Credential, role::Role};
