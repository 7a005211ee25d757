//! Role Resolver
//!
//! Determines which role a credential belongs to by probing the role
//! profile endpoints in a fixed order (Student, then Institute). The first
//! probe that succeeds wins and the remaining probes are skipped. Student
//! goes first because it carries most of the traffic, and a credential
//! valid for both roles resolves as Student.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::entity::profile::Identity;
use crate::domain::gateway::ProfileGateway;
use crate::domain::value_object::{credential::Credential, role::Role};
use crate::error::{ApiError, ResolveFailure};

/// Role resolver
pub struct RoleResolver<G>
where
    G: ProfileGateway,
{
    gateway: Arc<G>,
}

impl<G> RoleResolver<G>
where
    G: ProfileGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Resolve `raw_credential` to an identity
    ///
    /// Cancellation is honoured before every probe and while a probe is
    /// outstanding; a cancelled call returns without starting further
    /// probes and has no side effects.
    pub async fn resolve(
        &self,
        raw_credential: &str,
        cancel: &CancellationToken,
    ) -> Result<Identity, ResolveFailure> {
        let Some(credential) = Credential::parse(raw_credential) else {
            tracing::debug!("Malformed credential, skipping probes");
            return Err(ResolveFailure::CredentialRejected);
        };

        let mut failures: Vec<(Role, ApiError)> = Vec::with_capacity(Role::PROBE_ORDER.len());

        for role in Role::PROBE_ORDER {
            if cancel.is_cancelled() {
                return Err(ResolveFailure::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ResolveFailure::Cancelled),
                outcome = self.gateway.fetch_profile(role, &credential) => outcome,
            };

            match outcome {
                Ok(profile) => {
                    tracing::debug!(role = %role, "Role probe succeeded");
                    return Identity::new(role, profile).ok_or(ResolveFailure::CredentialRejected);
                }
                Err(e) => {
                    tracing::debug!(role = %role, error = %e, "Role probe failed");
                    failures.push((role, e));
                }
            }
        }

        Err(Self::classify(&failures))
    }

    /// Any transient probe failure makes the whole resolution transient
    fn classify(failures: &[(Role, ApiError)]) -> ResolveFailure {
        match failures.iter().find(|(_, e)| e.is_transient()) {
            Some((role, e)) => ResolveFailure::Transient(format!("{role} probe: {e}")),
            None => ResolveFailure::CredentialRejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::profile::Profile;
    use serde_json::json;
    use std::sync::Mutex;

    /// Gateway answering from a fixed per-role script
    struct ScriptedGateway {
        student: Result<Profile, ApiError>,
        institute: Result<Profile, ApiError>,
        calls: Mutex<Vec<Role>>,
    }

    impl ScriptedGateway {
        fn new(student: Result<Profile, ApiError>, institute: Result<Profile, ApiError>) -> Self {
            Self {
                student,
                institute,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Role> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProfileGateway for ScriptedGateway {
        async fn fetch_profile(&self, role: Role, _credential: &Credential) -> Result<Profile, ApiError> {
            self.calls.lock().unwrap().push(role);
            match role {
                Role::Student => self.student.clone(),
                Role::Institute => self.institute.clone(),
                Role::Anonymous => unreachable!("anonymous is never probed"),
            }
        }

        async fn logout(&self, _role: Role, _credential: &Credential) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn profile(name: &str) -> Profile {
        Profile::from_value(json!({ "name": name })).unwrap()
    }

    fn unauthorized(path: &str) -> ApiError {
        ApiError::status(path, 401)
    }

    #[tokio::test]
    async fn test_student_first_skips_institute() {
        let gateway = Arc::new(ScriptedGateway::new(
            Ok(profile("student")),
            Ok(profile("institute")),
        ));
        let resolver = RoleResolver::new(gateway.clone());

        let identity = resolver
            .resolve("tok", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(identity.role(), Role::Student);
        assert_eq!(gateway.calls(), vec![Role::Student]);
    }

    #[tokio::test]
    async fn test_falls_back_to_institute() {
        let gateway = Arc::new(ScriptedGateway::new(
            Err(unauthorized("/api/students/profile")),
            Ok(profile("institute")),
        ));
        let resolver = RoleResolver::new(gateway.clone());

        let identity = resolver
            .resolve("tok", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(identity.role(), Role::Institute);
        assert_eq!(gateway.calls(), vec![Role::Student, Role::Institute]);
    }

    #[tokio::test]
    async fn test_both_rejected() {
        let gateway = Arc::new(ScriptedGateway::new(
            Err(unauthorized("/api/students/profile")),
            Err(ApiError::status("/api/institutes/profile", 404)),
        ));
        let resolver = RoleResolver::new(gateway);

        let result = resolver.resolve("tok", &CancellationToken::new()).await;
        assert_eq!(result, Err(ResolveFailure::CredentialRejected));
    }

    #[tokio::test]
    async fn test_any_transient_probe_makes_failure_transient() {
        let gateway = Arc::new(ScriptedGateway::new(
            Err(ApiError::status("/api/students/profile", 503)),
            Err(unauthorized("/api/institutes/profile")),
        ));
        let resolver = RoleResolver::new(gateway);

        let result = resolver.resolve("tok", &CancellationToken::new()).await;
        assert!(matches!(result, Err(ResolveFailure::Transient(_))));

        let gateway = Arc::new(ScriptedGateway::new(
            Err(unauthorized("/api/students/profile")),
            Err(ApiError::network("/api/institutes/profile", "connection reset")),
        ));
        let resolver = RoleResolver::new(gateway);

        let result = resolver.resolve("tok", &CancellationToken::new()).await;
        assert!(matches!(result, Err(ResolveFailure::Transient(_))));
    }

    #[tokio::test]
    async fn test_malformed_credential_makes_no_calls() {
        let gateway = Arc::new(ScriptedGateway::new(
            Ok(profile("student")),
            Ok(profile("institute")),
        ));
        let resolver = RoleResolver::new(gateway.clone());

        for raw in ["", "   ", "null", "undefined"] {
            let result = resolver.resolve(raw, &CancellationToken::new()).await;
            assert_eq!(result, Err(ResolveFailure::CredentialRejected));
        }
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_calls() {
        let gateway = Arc::new(ScriptedGateway::new(
            Ok(profile("student")),
            Ok(profile("institute")),
        ));
        let resolver = RoleResolver::new(gateway.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = resolver.resolve("tok", &cancel).await;
        assert_eq!(result, Err(ResolveFailure::Cancelled));
        assert!(gateway.calls().is_empty());
    }

    /// Gateway whose student probe blocks until released
    struct GatedGateway {
        release: tokio::sync::Notify,
        calls: Mutex<Vec<Role>>,
    }

    impl ProfileGateway for GatedGateway {
        async fn fetch_profile(&self, role: Role, _credential: &Credential) -> Result<Profile, ApiError> {
            self.calls.lock().unwrap().push(role);
            if role == Role::Student {
                self.release.notified().await;
                return Err(ApiError::status("/api/students/profile", 401));
            }
            Ok(profile("institute"))
        }

        async fn logout(&self, _role: Role, _credential: &Credential) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cancel_during_first_probe_skips_second() {
        let gateway = Arc::new(GatedGateway {
            release: tokio::sync::Notify::new(),
            calls: Mutex::new(Vec::new()),
        });
        let resolver = RoleResolver::new(gateway.clone());
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            async move {
                tokio::task::yield_now().await;
                cancel.cancel();
            }
        };
        let (result, ()) = tokio::join!(resolver.resolve("tok", &cancel), canceller);

        assert_eq!(result, Err(ResolveFailure::Cancelled));
        assert_eq!(gateway.calls.lock().unwrap().clone(), vec![Role::Student]);
    }
}
