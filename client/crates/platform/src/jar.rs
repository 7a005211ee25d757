//! Cookie Jars
//!
//! The page-visible cookie store. A jar exposes the same two primitives as
//! `document.cookie`: read the whole `name=value; ...` string, and apply a
//! single assignment.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::cookie::CookieAssignment;
use crate::storage::StorageError;

pub trait CookieJar: Send + Sync {
    /// Current cookies as `name=value; name=value`
    fn cookie_string(&self) -> String;

    /// Apply one `name=value; Attr=...` assignment
    fn set_cookie(&self, assignment: &str) -> Result<(), StorageError>;
}

impl<J: CookieJar + ?Sized> CookieJar for std::sync::Arc<J> {
    fn cookie_string(&self) -> String {
        (**self).cookie_string()
    }

    fn set_cookie(&self, assignment: &str) -> Result<(), StorageError> {
        (**self).set_cookie(assignment)
    }
}

/// In-memory jar applying browser semantics: `Max-Age<=0` deletes
///
/// Also keeps the last raw assignment per name so callers can inspect
/// the attributes that were written.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    inner: Mutex<JarState>,
}

#[derive(Debug, Default)]
struct JarState {
    values: BTreeMap<String, String>,
    last_assignment: BTreeMap<String, String>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw assignment most recently applied for `name`
    pub fn last_assignment(&self, name: &str) -> Option<String> {
        self.lock().last_assignment.get(name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JarState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_string(&self) -> String {
        self.lock()
            .values
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie(&self, assignment: &str) -> Result<(), StorageError> {
        let parsed = CookieAssignment::parse(assignment).ok_or_else(|| {
            StorageError::WriteRejected {
                key: "cookie".to_string(),
                reason: "malformed assignment".to_string(),
            }
        })?;

        let mut state = self.lock();
        state
            .last_assignment
            .insert(parsed.name.clone(), assignment.to_string());
        if parsed.is_expired() {
            state.values.remove(&parsed.name);
        } else {
            state.values.insert(parsed.name, parsed.value);
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;

    use super::CookieJar;
    use crate::storage::StorageError;

    /// `document.cookie` of the current window
    #[derive(Debug, Clone, Copy, Default)]
    pub struct DocumentCookieJar;

    impl DocumentCookieJar {
        fn document() -> Result<web_sys::HtmlDocument, StorageError> {
            web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
                .ok_or_else(|| StorageError::Unavailable("no HTML document".to_string()))
        }
    }

    impl CookieJar for DocumentCookieJar {
        fn cookie_string(&self) -> String {
            Self::document()
                .ok()
                .and_then(|doc| doc.cookie().ok())
                .unwrap_or_default()
        }

        fn set_cookie(&self, assignment: &str) -> Result<(), StorageError> {
            Self::document()?
                .set_cookie(assignment)
                .map_err(|e| StorageError::WriteRejected {
                    key: "cookie".to_string(),
                    reason: format!("{:?}", e),
                })
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::DocumentCookieJar;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::{CookieConfig, extract_cookie};

    #[test]
    fn test_memory_jar_write_then_delete() {
        let jar = MemoryCookieJar::new();
        let config = CookieConfig::default();

        jar.set_cookie(&config.build_set_cookie("tok")).unwrap();
        assert_eq!(
            extract_cookie(&jar.cookie_string(), "authToken"),
            Some("tok".to_string())
        );

        jar.set_cookie(&config.build_delete_cookie()).unwrap();
        assert_eq!(extract_cookie(&jar.cookie_string(), "authToken"), None);
        assert!(
            jar.last_assignment("authToken")
                .unwrap()
                .contains("Max-Age=0")
        );
    }

    #[test]
    fn test_memory_jar_keeps_other_cookies() {
        let jar = MemoryCookieJar::new();
        jar.set_cookie("theme=dark; Path=/").unwrap();
        jar.set_cookie("authToken=x; Path=/").unwrap();
        jar.set_cookie("authToken=; Path=/; Max-Age=0").unwrap();

        assert_eq!(jar.cookie_string(), "theme=dark");
    }

    #[test]
    fn test_memory_jar_rejects_malformed() {
        let jar = MemoryCookieJar::new();
        assert!(jar.set_cookie("garbage").is_err());
    }
}
