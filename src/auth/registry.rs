//! Process-held registry of credential sources.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::utils::error::{ToolboxError, ToolboxResult};

/// A zero-argument function producing a fresh credential token.
pub type TokenGetter = Arc<dyn Fn() -> String + Send + Sync>;

/// Maps authentication source names to their token getters.
///
/// The registry is shared between the owning client and every tool it
/// produces; clones are handles onto the same underlying map. Reads vastly
/// outnumber writes, hence the reader-friendly lock.
#[derive(Clone, Default)]
pub struct CredentialRegistry {
    sources: Arc<RwLock<HashMap<String, TokenGetter>>>,
}

impl fmt::Debug for CredentialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.sources.read().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("CredentialRegistry")
            .field("source_count", &count)
            .finish_non_exhaustive()
    }
}

impl CredentialRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token getter for `source`, replacing any existing getter.
    ///
    /// Re-registration is deliberately not an error: repeated load calls with
    /// the same token set must succeed, last write wins.
    pub fn register<F>(&self, source: &str, getter: F) -> ToolboxResult<()>
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        let mut sources = self
            .sources
            .write()
            .map_err(|_| ToolboxError::Internal("credential registry lock poisoned".to_string()))?;
        debug!("Registering credential source `{}`", source);
        sources.insert(source.to_string(), Arc::new(getter));
        Ok(())
    }

    /// Returns true when a getter is registered for `source`.
    pub fn contains(&self, source: &str) -> bool {
        self.sources
            .read()
            .map(|sources| sources.contains_key(source))
            .unwrap_or(false)
    }

    /// Resolves tokens for every *registered* source in `source_names`.
    ///
    /// Getters run eagerly, at call time, outside the lock. Requested sources
    /// with no registered getter are simply absent from the result; detecting
    /// and rejecting that absence is the caller's job.
    pub fn resolve(&self, source_names: &[String]) -> ToolboxResult<HashMap<String, String>> {
        let getters: Vec<(String, TokenGetter)> = {
            let sources = self.sources.read().map_err(|_| {
                ToolboxError::Internal("credential registry lock poisoned".to_string())
            })?;
            source_names
                .iter()
                .filter_map(|name| {
                    sources
                        .get(name)
                        .map(|getter| (name.clone(), Arc::clone(getter)))
                })
                .collect()
        };

        Ok(getters
            .into_iter()
            .map(|(name, getter)| {
                let token = getter();
                (name, token)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let registry = CredentialRegistry::new();
        registry.register("src1", || "tok1".to_string()).unwrap();

        assert!(registry.contains("src1"));
        assert!(!registry.contains("src2"));

        let tokens = registry
            .resolve(&["src1".to_string(), "src2".to_string()])
            .unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens["src1"], "tok1");
    }

    #[test]
    fn test_reregistration_last_write_wins() {
        let registry = CredentialRegistry::new();
        registry.register("src", || "first".to_string()).unwrap();
        registry.register("src", || "second".to_string()).unwrap();

        let tokens = registry.resolve(&["src".to_string()]).unwrap();
        assert_eq!(tokens["src"], "second");
    }

    #[test]
    fn test_getters_run_at_resolve_time() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let counter = Arc::new(AtomicU32::new(0));
        let registry = CredentialRegistry::new();
        let counter_clone = counter.clone();
        registry
            .register("src", move || {
                let n = counter_clone.fetch_add(1, Ordering::SeqCst);
                format!("tok-{}", n)
            })
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(registry.resolve(&["src".to_string()]).unwrap()["src"], "tok-0");
        assert_eq!(registry.resolve(&["src".to_string()]).unwrap()["src"], "tok-1");
    }
}
