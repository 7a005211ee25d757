//! Runtime Helpers
//!
//! Task spawning and timers that work both in the browser event loop and
//! on a native tokio runtime.

use std::future::Future;
use std::time::Duration;

/// Run a future to completion in the background
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// Run a future to completion in the background
#[cfg(target_arch = "wasm32")]
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Suspend the current task for `duration`
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Suspend the current task for `duration`
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::future::TimeoutFuture::new(millis).await;
}

/// Whether the current page was served over https
///
/// Native builds have no page; callers decide from configuration instead.
#[cfg(target_arch = "wasm32")]
pub fn page_is_secure() -> bool {
    web_sys::window()
        .and_then(|w| w.location().protocol().ok())
        .is_some_and(|protocol| protocol == "https:")
}
