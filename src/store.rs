//! Persistence of the user's chosen language.
//!
//! The medium is opaque to this crate: browsers typically back this with a
//! cookie, servers with a session record. Only the load/save contract
//! matters here.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

/// Async load/save of a single previously chosen language code.
///
/// `load` returns `None` when nothing was saved; returning an unsupported
/// code is fine, the session discards it during preference resolution.
pub trait PreferenceStore: Send + Sync {
    fn save(&self, code: &str) -> BoxFuture<'_, anyhow::Result<()>>;
    fn load(&self) -> BoxFuture<'_, anyhow::Result<Option<String>>>;
}

/// In-memory store, for tests and embedders without real persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_saved(code: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            saved: Mutex::new(Some(code.into())),
        })
    }
}

impl PreferenceStore for MemoryStore {
    fn save(&self, code: &str) -> BoxFuture<'_, anyhow::Result<()>> {
        let code = code.to_string();
        Box::pin(async move {
            *self.saved.lock().await = Some(code);
            Ok(())
        })
    }

    fn load(&self) -> BoxFuture<'_, anyhow::Result<Option<String>>> {
        Box::pin(async move { Ok(self.saved.lock().await.clone()) })
    }
}
