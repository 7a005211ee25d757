//! Session State Entity
//!
//! The single value the rest of the application observes.

use crate::domain::entity::profile::{Identity, Profile};
use crate::domain::value_object::role::Role;

/// Coarse lifecycle phase derived from [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Resolving,
    Authenticated(Role),
    Anonymous,
}

/// Session state
///
/// Invariants:
/// - an identity is only ever present together with a credential
/// - identity is replaced wholesale, never patched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    identity: Option<Identity>,
    credential_present: bool,
    resolving: bool,
    initialized: bool,
}

impl SessionState {
    /// Empty, settled state (no credential, nothing outstanding)
    pub fn anonymous() -> Self {
        Self {
            initialized: true,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if !self.initialized {
            return SessionPhase::Uninitialized;
        }
        if self.resolving {
            return SessionPhase::Resolving;
        }
        match &self.identity {
            Some(identity) => SessionPhase::Authenticated(identity.role()),
            None => SessionPhase::Anonymous,
        }
    }

    pub fn role(&self) -> Role {
        self.identity
            .as_ref()
            .map(Identity::role)
            .unwrap_or(Role::Anonymous)
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.identity.as_ref().map(Identity::profile)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn has_credential(&self) -> bool {
        self.credential_present
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    // ------------------------------------------------------------------
    // Transitions (driven by the session coordinator only)
    // ------------------------------------------------------------------

    /// A resolution started; identity is left as-is (possibly optimistic)
    pub(crate) fn begin_resolving(&mut self, credential_present: bool) {
        self.initialized = true;
        self.resolving = true;
        self.credential_present = credential_present;
        if !credential_present {
            self.identity = None;
        }
    }

    /// Publish a cached identity while the network confirms it
    pub(crate) fn assume(&mut self, identity: Identity) {
        self.initialized = true;
        self.credential_present = true;
        self.identity = Some(identity);
    }

    /// A resolution succeeded
    pub(crate) fn settle_authenticated(&mut self, identity: Identity) {
        self.assume(identity);
        self.resolving = false;
    }

    /// A resolution ended without changing identity
    pub(crate) fn settle_unchanged(&mut self) {
        self.initialized = true;
        self.resolving = false;
    }

    /// Logout, rejection or missing credential
    pub(crate) fn reset(&mut self) {
        *self = Self::anonymous();
    }
}
