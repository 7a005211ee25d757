//! Gateway Traits
//!
//! Interfaces to the remote identity API. Implementation is in the
//! infrastructure layer.
//!
//! Native builds bound on the `Send` variant. The browser runs on one
//! thread and its fetch futures are not `Send`, so there the local trait is
//! the only one and carries both names.

use crate::domain::entity::profile::Profile;
use crate::domain::value_object::{credential::Credential, role::Role};
use crate::error::ApiError;

/// Role-specific identity endpoints
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(ProfileGateway: Send))]
#[cfg_attr(target_arch = "wasm32", allow(async_fn_in_trait))]
pub trait LocalProfileGateway {
    /// Fetch the profile of `role` authenticated with `credential`
    ///
    /// A 2xx whose body is not a non-empty object is reported as
    /// `ApiError::InvalidBody`.
    async fn fetch_profile(&self, role: Role, credential: &Credential) -> Result<Profile, ApiError>;

    /// Tear down the server-side session of `role`
    async fn logout(&self, role: Role, credential: &Credential) -> Result<(), ApiError>;
}

#[cfg(target_arch = "wasm32")]
pub use self::LocalProfileGateway as ProfileGateway;
