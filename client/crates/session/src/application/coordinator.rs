//! Session Coordinator
//!
//! Owns the published [`SessionState`] and is the only writer of the
//! Persistence Mirror. Two ways to start a resolution:
//!
//! - [`SessionCoordinator::refresh`] joins an outstanding resolution if
//!   there is one (single-flight)
//! - [`SessionCoordinator::restart`] supersedes it (newest call wins)
//!
//! Every resolution carries a generation number and a cancellation token.
//! A resolution only publishes while it is still the current flight, checked
//! under the flight lock, so a superseded result can never overwrite a newer
//! one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::Shared;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::application::auth_gate::SessionHandle;
use crate::application::config::SessionConfig;
use crate::application::credential_store::CredentialStore;
use crate::application::role_resolver::RoleResolver;
use crate::domain::entity::session_state::SessionState;
use crate::domain::gateway::ProfileGateway;
use crate::domain::value_object::{credential::Credential, role::Role};
use crate::error::{ResolveFailure, SessionError, SessionResult};

#[cfg(not(target_arch = "wasm32"))]
type Resolution = futures_util::future::BoxFuture<'static, SessionResult<SessionState>>;
#[cfg(target_arch = "wasm32")]
type Resolution = futures_util::future::LocalBoxFuture<'static, SessionResult<SessionState>>;

type Flight = Shared<Resolution>;

struct InFlight {
    generation: u64,
    token: CancellationToken,
    future: Flight,
}

#[derive(Default)]
struct FlightSlot {
    next_generation: u64,
    current: Option<InFlight>,
}

impl FlightSlot {
    fn is_current(&self, generation: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|flight| flight.generation == generation)
    }

    /// Cancel and forget the outstanding flight, if any
    fn invalidate(&mut self) -> bool {
        match self.current.take() {
            Some(flight) => {
                flight.token.cancel();
                true
            }
            None => false,
        }
    }
}

struct Inner<G>
where
    G: ProfileGateway,
{
    resolver: RoleResolver<G>,
    gateway: Arc<G>,
    store: CredentialStore,
    config: SessionConfig,
    state: watch::Sender<SessionState>,
    flight: Mutex<FlightSlot>,
    bootstrapped: AtomicBool,
    logging_out: AtomicBool,
}

impl<G> Inner<G>
where
    G: ProfileGateway,
{
    fn lock_flight(&self) -> MutexGuard<'_, FlightSlot> {
        self.flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }
}

/// Session coordinator
///
/// Cheap to clone; all clones share one session.
pub struct SessionCoordinator<G>
where
    G: ProfileGateway,
{
    inner: Arc<Inner<G>>,
}

impl<G> Clone for SessionCoordinator<G>
where
    G: ProfileGateway,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<G> SessionCoordinator<G>
where
    G: ProfileGateway + Send + Sync + 'static,
{
    pub fn new(gateway: Arc<G>, store: CredentialStore, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                resolver: RoleResolver::new(gateway.clone()),
                gateway,
                store,
                config,
                state,
                flight: Mutex::new(FlightSlot::default()),
                bootstrapped: AtomicBool::new(false),
                logging_out: AtomicBool::new(false),
            }),
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.inner.snapshot()
    }

    /// Observe every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// First call per coordinator: repair storage, publish the cached
    /// identity if it belongs to the current cookie, and start a resolution
    /// in the background. Later calls only return the current state.
    ///
    /// Must be called inside a runtime.
    pub fn bootstrap(&self) -> SessionState {
        if self.inner.bootstrapped.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        let store = &self.inner.store;
        store.purge_corrupt();

        if let Some(credential) = store.read() {
            if store.mirrored_token().as_ref() == Some(&credential) {
                if let Some(identity) = store.read_mirror() {
                    tracing::debug!(role = %identity.role(), "Publishing cached identity");
                    self.inner.state.send_modify(|s| s.assume(identity));
                }
            }
        }

        // Driven by its spawned task.
        let _ = self.start(false);
        self.state()
    }

    /// Resolve the current credential, joining an outstanding resolution
    ///
    /// A rejected credential yields `Ok` with the anonymous state; a
    /// transient failure yields [`SessionError::Transient`] and leaves the
    /// previous identity in place.
    pub async fn refresh(&self) -> SessionResult<SessionState> {
        self.start(false).await
    }

    /// Resolve the current credential, superseding any outstanding resolution
    pub async fn restart(&self) -> SessionResult<SessionState> {
        self.start(true).await
    }

    /// Store a freshly issued credential and resolve it
    pub async fn sign_in(&self, credential: Credential) -> SessionResult<SessionState> {
        self.inner.store.write(&credential)?;
        platform::runtime::sleep(self.inner.config.settle_delay).await;
        self.restart().await
    }

    /// [`sign_in`](Self::sign_in) after signup, remembering the address
    /// that still has to be verified
    pub async fn register_signup(
        &self,
        credential: Credential,
        email: &str,
        role: Role,
    ) -> SessionResult<SessionState> {
        self.inner.store.write_pending_verification(email, role)?;
        self.sign_in(credential).await
    }

    /// End the session everywhere
    ///
    /// Idempotent. The server-side logout is best effort; local state is
    /// always cleared. Concurrent calls send at most one logout request.
    /// The work runs on its own task, so it completes even when the caller
    /// stops waiting. A credential stored by a sign-in while the request
    /// was out is left in place.
    pub async fn logout(&self) {
        self.inner.lock_flight().invalidate();

        let role = self.state().role();
        let credential = self.inner.store.read();
        let inner = self.inner.clone();
        let (done, finished) = oneshot::channel();
        platform::runtime::spawn(async move {
            Self::end_session(inner, role, credential).await;
            let _ = done.send(());
        });
        let _ = finished.await;
    }

    async fn end_session(inner: Arc<Inner<G>>, role: Role, credential: Option<Credential>) {
        let server_side = credential.as_ref().filter(|_| role.is_authenticated());
        if let Some(token) = server_side {
            if !inner.logging_out.swap(true, Ordering::SeqCst) {
                match inner.gateway.logout(role, token).await {
                    Ok(()) => tracing::debug!(role = %role, "Server-side logout succeeded"),
                    Err(e) => tracing::warn!(role = %role, error = %e, "Server-side logout failed"),
                }
                inner.logging_out.store(false, Ordering::SeqCst);
            }
        }

        let mut slot = inner.lock_flight();
        let current = inner.store.read();
        if current.is_some() && current != credential {
            tracing::debug!("Newer credential stored during logout, keeping it");
            return;
        }
        // Another resolution may have started while the request was out.
        slot.invalidate();
        inner.store.clear_all();
        inner.state.send_modify(SessionState::reset);
        drop(slot);
        tracing::info!("Logged out");
    }

    /// The owning UI scope went away: abandon the outstanding resolution
    pub fn cancel(&self) {
        let mut slot = self.inner.lock_flight();
        if slot.invalidate() {
            tracing::debug!("Resolution cancelled");
            self.inner.state.send_modify(SessionState::settle_unchanged);
        }
    }

    fn start(&self, supersede: bool) -> Flight {
        let (future, generation) = {
            let mut slot = self.inner.lock_flight();
            if let Some(current) = &slot.current {
                if !supersede {
                    return current.future.clone();
                }
                tracing::debug!(generation = current.generation, "Superseding resolution");
            }
            slot.invalidate();

            slot.next_generation += 1;
            let generation = slot.next_generation;
            let token = CancellationToken::new();
            let credential = self.inner.store.read();

            self.inner
                .state
                .send_modify(|s| s.begin_resolving(credential.is_some()));

            let resolution = Self::resolve(self.inner.clone(), generation, credential, token.clone());
            #[cfg(not(target_arch = "wasm32"))]
            let resolution = resolution.boxed();
            #[cfg(target_arch = "wasm32")]
            let resolution = resolution.boxed_local();
            let future = resolution.shared();
            slot.current = Some(InFlight {
                generation,
                token,
                future: future.clone(),
            });
            (future, generation)
        };

        tracing::debug!(generation, "Resolution started");
        let driver = future.clone();
        platform::runtime::spawn(async move {
            let _ = driver.await;
        });
        future
    }

    async fn resolve(
        inner: Arc<Inner<G>>,
        generation: u64,
        credential: Option<Credential>,
        token: CancellationToken,
    ) -> SessionResult<SessionState> {
        let outcome = match &credential {
            Some(credential) => Some(inner.resolver.resolve(credential.as_str(), &token).await),
            None => None,
        };

        let mut slot = inner.lock_flight();
        if !slot.is_current(generation) {
            tracing::debug!(generation, "Discarding superseded resolution");
            return Ok(inner.snapshot());
        }
        slot.current = None;

        match outcome {
            None => {
                inner.store.clear_mirror();
                inner.state.send_modify(SessionState::reset);
                Ok(inner.snapshot())
            }
            Some(Ok(identity)) => {
                if let Err(e) = inner.store.write_mirror(&identity) {
                    tracing::warn!(error = %e, "Failed to mirror resolved identity");
                }
                tracing::info!(role = %identity.role(), "Session resolved");
                inner.state.send_modify(|s| s.settle_authenticated(identity));
                Ok(inner.snapshot())
            }
            Some(Err(ResolveFailure::CredentialRejected)) => {
                inner.store.clear_all();
                inner.state.send_modify(SessionState::reset);
                SessionError::CredentialRejected.log();
                Ok(inner.snapshot())
            }
            Some(Err(ResolveFailure::Transient(message))) => {
                inner.state.send_modify(SessionState::settle_unchanged);
                let err = SessionError::Transient(message);
                err.log();
                Err(err)
            }
            // The token is only cancelled after the flight left the slot.
            Some(Err(ResolveFailure::Cancelled)) => Ok(inner.snapshot()),
        }
    }
}

impl<G> SessionHandle for SessionCoordinator<G>
where
    G: ProfileGateway + Send + Sync + 'static,
{
    fn current_credential(&self) -> Option<Credential> {
        self.inner.store.read()
    }

    async fn force_logout(&self) {
        self.logout().await;
    }
}
