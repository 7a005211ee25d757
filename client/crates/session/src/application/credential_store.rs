//! Credential Store
//!
//! One view over the three persistence substrates:
//! - the credential cookie (authoritative for "is there a credential")
//! - the durable store (Persistence Mirror: profile, role, token copy)
//! - the tab-scoped store (pending email verification)
//!
//! Performs no network I/O. Corrupt durable entries are repaired on read
//! and never reported to callers.

use std::sync::Arc;

use platform::cookie::{CookieConfig, extract_cookie};
use platform::jar::CookieJar;
use platform::storage::KeyValueStore;

use crate::application::config::{SessionConfig, StorageKeys};
use crate::domain::entity::profile::{Identity, Profile};
use crate::domain::value_object::credential::{Credential, is_corrupt_literal};
use crate::domain::value_object::role::Role;
use crate::error::{SessionError, SessionResult};

/// Signup awaiting email verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub email: String,
    pub role: Role,
}

pub struct CredentialStore {
    cookies: Arc<dyn CookieJar>,
    durable: Arc<dyn KeyValueStore>,
    transient: Arc<dyn KeyValueStore>,
    cookie: CookieConfig,
    keys: StorageKeys,
}

impl CredentialStore {
    pub fn new(
        cookies: Arc<dyn CookieJar>,
        durable: Arc<dyn KeyValueStore>,
        transient: Arc<dyn KeyValueStore>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            cookies,
            durable,
            transient,
            cookie: config.cookie(),
            keys: config.keys.clone(),
        }
    }

    // ========================================================================
    // Credential (cookie)
    // ========================================================================

    /// Current credential, if the cookie holds a usable one
    pub fn read(&self) -> Option<Credential> {
        extract_cookie(&self.cookies.cookie_string(), &self.cookie.name)
            .and_then(Credential::parse)
    }

    /// Store a freshly issued credential
    pub fn write(&self, credential: &Credential) -> SessionResult<()> {
        self.cookies
            .set_cookie(&self.cookie.build_set_cookie(credential.as_str()))?;
        self.durable.set(&self.keys.token, credential.as_str())?;
        Ok(())
    }

    /// Expire the cookie and drop its durable copy
    pub fn clear(&self) {
        if let Err(e) = self.cookies.set_cookie(&self.cookie.build_delete_cookie()) {
            tracing::warn!(error = %e, "Failed to expire credential cookie");
        }
        self.durable.remove(&self.keys.token);
    }

    /// Durable copy of the credential written alongside the cookie
    pub fn mirrored_token(&self) -> Option<Credential> {
        self.durable.get(&self.keys.token).and_then(Credential::parse)
    }

    // ========================================================================
    // Persistence Mirror (durable store)
    // ========================================================================

    /// Last resolved identity, if the mirror holds a complete, readable one
    pub fn read_mirror(&self) -> Option<Identity> {
        let profile = self.read_profile();
        let role = self.read_role();

        match (role, profile) {
            (Some(role), Some(profile)) => Identity::new(role, profile),
            (None, None) => None,
            _ => {
                tracing::debug!("Incomplete session mirror, discarding");
                self.clear_mirror();
                None
            }
        }
    }

    pub fn write_mirror(&self, identity: &Identity) -> SessionResult<()> {
        let profile = serde_json::to_string(identity.profile())
            .map_err(|e| SessionError::Config(format!("Unserializable profile: {e}")))?;
        self.durable.set(&self.keys.profile, &profile)?;
        self.durable.set(&self.keys.role, identity.role().code())?;
        Ok(())
    }

    pub fn clear_mirror(&self) {
        self.durable.remove(&self.keys.profile);
        self.durable.remove(&self.keys.role);
    }

    fn read_profile(&self) -> Option<Profile> {
        let raw = self.durable.get(&self.keys.profile)?;
        match serde_json::from_str::<Profile>(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(key = %self.keys.profile, error = %e, "Removing corrupt mirror entry");
                self.durable.remove(&self.keys.profile);
                None
            }
        }
    }

    fn read_role(&self) -> Option<Role> {
        let raw = self.durable.get(&self.keys.role)?;
        let role = Role::from_code(&raw);
        if role.is_none() {
            tracing::warn!(key = %self.keys.role, "Removing corrupt mirror entry");
            self.durable.remove(&self.keys.role);
        }
        role
    }

    /// Remove durable entries holding `"undefined"` / `"null"`
    ///
    /// Returns how many entries were removed.
    pub fn purge_corrupt(&self) -> usize {
        let keys = [&self.keys.profile, &self.keys.role, &self.keys.token];
        let mut removed = 0;
        for key in keys {
            if self.durable.get(key).is_some_and(|v| is_corrupt_literal(&v)) {
                self.durable.remove(key);
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, "Purged corrupt session entries");
        }
        removed
    }

    // ========================================================================
    // Transient (tab-scoped) store
    // ========================================================================

    pub fn write_transient(&self, key: &str, value: &str) -> SessionResult<()> {
        self.transient.set(key, value)?;
        Ok(())
    }

    pub fn read_transient(&self, key: &str) -> Option<String> {
        self.transient.get(key)
    }

    pub fn clear_transient(&self) {
        self.transient.remove(&self.keys.verify_email);
        self.transient.remove(&self.keys.verify_role);
    }

    /// Record which address and role await verification after signup
    pub fn write_pending_verification(&self, email: &str, role: Role) -> SessionResult<()> {
        self.write_transient(&self.keys.verify_email, email)?;
        self.write_transient(&self.keys.verify_role, role.code())?;
        Ok(())
    }

    pub fn pending_verification(&self) -> Option<PendingVerification> {
        let email = self.read_transient(&self.keys.verify_email)?;
        let role = Role::from_code(&self.read_transient(&self.keys.verify_role)?)?;
        Some(PendingVerification { email, role })
    }

    /// Logout: every substrate at once
    pub fn clear_all(&self) {
        self.clear();
        self.clear_mirror();
        self.clear_transient();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::jar::MemoryCookieJar;
    use platform::storage::MemoryStore;
    use serde_json::json;

    struct Substrates {
        jar: Arc<MemoryCookieJar>,
        durable: Arc<MemoryStore>,
        transient: Arc<MemoryStore>,
    }

    fn store_with(durable: MemoryStore) -> (CredentialStore, Substrates) {
        let subs = Substrates {
            jar: Arc::new(MemoryCookieJar::new()),
            durable: Arc::new(durable),
            transient: Arc::new(MemoryStore::new()),
        };
        let store = CredentialStore::new(
            subs.jar.clone(),
            subs.durable.clone(),
            subs.transient.clone(),
            &SessionConfig::default(),
        );
        (store, subs)
    }

    fn store() -> (CredentialStore, Substrates) {
        store_with(MemoryStore::new())
    }

    fn student() -> Identity {
        let profile = Profile::from_value(json!({"name": "Ravi"})).unwrap();
        Identity::new(Role::Student, profile).unwrap()
    }

    #[test]
    fn test_write_read_clear_round_trip() {
        let (store, subs) = store();
        let credential = Credential::parse("tok-123").unwrap();

        store.write(&credential).unwrap();
        assert_eq!(store.read(), Some(credential.clone()));
        assert_eq!(store.mirrored_token(), Some(credential));

        store.clear();
        assert_eq!(store.read(), None);
        assert_eq!(store.mirrored_token(), None);
        assert!(!subs.durable.contains_key("authToken"));
    }

    #[test]
    fn test_cookie_attributes() {
        let (store, subs) = store();
        store.write(&Credential::parse("t").unwrap()).unwrap();

        let written = subs.jar.last_assignment("authToken").unwrap();
        assert!(written.contains("Path=/"));
        assert!(written.contains("SameSite=Strict"));
        assert!(written.contains("Secure"));
        assert!(written.contains("Max-Age=604800"));

        store.clear();
        let cleared = subs.jar.last_assignment("authToken").unwrap();
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn test_blank_cookie_reads_as_absent() {
        let (store, subs) = store();
        subs.jar.set_cookie("authToken=%20%20; Path=/").unwrap();
        assert_eq!(store.read(), None);

        subs.jar.set_cookie("authToken=undefined; Path=/").unwrap();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_mirror_round_trip() {
        let (store, subs) = store();
        store.write_mirror(&student()).unwrap();

        assert_eq!(subs.durable.get("userType"), Some("student".to_string()));
        assert_eq!(store.read_mirror(), Some(student()));

        store.clear_mirror();
        assert_eq!(store.read_mirror(), None);
    }

    #[test]
    fn test_corrupt_profile_is_removed_on_read() {
        let (store, subs) = store_with(MemoryStore::with_entries([
            ("user", "{not json"),
            ("userType", "student"),
        ]));

        assert_eq!(store.read_mirror(), None);
        assert!(!subs.durable.contains_key("user"));
        assert!(!subs.durable.contains_key("userType"));
    }

    #[test]
    fn test_unknown_role_is_removed_on_read() {
        let (store, subs) = store_with(MemoryStore::with_entries([
            ("user", r#"{"name":"x"}"#),
            ("userType", "admin"),
        ]));

        assert_eq!(store.read_mirror(), None);
        assert!(subs.durable.is_empty());
    }

    #[test]
    fn test_purge_corrupt_literals() {
        let (store, subs) = store_with(MemoryStore::with_entries([
            ("user", "undefined"),
            ("userType", "null"),
            ("authToken", "real-token"),
            ("unrelated", "undefined"),
        ]));

        assert_eq!(store.purge_corrupt(), 2);
        assert!(!subs.durable.contains_key("user"));
        assert!(!subs.durable.contains_key("userType"));
        assert!(subs.durable.contains_key("authToken"));
        assert!(subs.durable.contains_key("unrelated"));
        assert_eq!(store.purge_corrupt(), 0);
    }

    #[test]
    fn test_pending_verification() {
        let (store, subs) = store();
        assert_eq!(store.pending_verification(), None);

        store
            .write_pending_verification("a@b.com", Role::Institute)
            .unwrap();
        assert_eq!(
            subs.transient.get("verify_user_type"),
            Some("institute".to_string())
        );
        assert_eq!(
            store.pending_verification(),
            Some(PendingVerification {
                email: "a@b.com".to_string(),
                role: Role::Institute,
            })
        );

        store.clear_transient();
        assert!(subs.transient.is_empty());
    }

    #[test]
    fn test_clear_all() {
        let (store, subs) = store();
        store.write(&Credential::parse("t").unwrap()).unwrap();
        store.write_mirror(&student()).unwrap();
        store
            .write_pending_verification("a@b.com", Role::Student)
            .unwrap();

        store.clear_all();
        assert_eq!(store.read(), None);
        assert!(subs.durable.is_empty());
        assert!(subs.transient.is_empty());
    }
}
