//! On-device model layer: artifact provisioning, session lifecycle and the
//! local engine backend.

pub mod artifact;
pub mod engine;
pub mod provision;
pub mod session;
pub mod types;

pub use artifact::SizeClass;
pub use session::SessionManager;

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::artifact::LocalModel;
    use super::provision::{ArtifactFetcher, ModelProvisioner};
    use super::session::{EngineLoader, SessionManager};
    use super::types::{CompletionRequest, InferenceError, LanguageEngine, ProvisionError};

    /// Fetcher that writes a tiny fake model and counts downloads.
    #[derive(Default)]
    pub struct FakeFetcher {
        pub downloads: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ArtifactFetcher for FakeFetcher {
        async fn fetch(&self, _url: &str, dest: &Path) -> Result<u64, ProvisionError> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            tokio::fs::write(dest, b"GGUF").await?;
            Ok(4)
        }
    }

    /// Fetcher that always fails, like a device with no network.
    pub struct OfflineFetcher;

    #[async_trait::async_trait]
    impl ArtifactFetcher for OfflineFetcher {
        async fn fetch(&self, _url: &str, _dest: &Path) -> Result<u64, ProvisionError> {
            Err(ProvisionError::Download("network unreachable".into()))
        }
    }

    /// Shared counters observed by tests.
    #[derive(Default)]
    pub struct EngineStats {
        pub loads: AtomicUsize,
        pub live: AtomicUsize,
        pub max_live: AtomicUsize,
        pub requests: Mutex<Vec<CompletionRequest>>,
    }

    /// Loader producing [`MockEngine`]s that reply with a fixed text, or fail.
    pub struct MockLoader {
        pub stats: Arc<EngineStats>,
        pub reply: Option<String>,
    }

    impl MockLoader {
        #[must_use]
        pub fn replying(text: &str) -> Self {
            Self { stats: Arc::new(EngineStats::default()), reply: Some(text.to_string()) }
        }

        #[must_use]
        pub fn failing() -> Self {
            Self { stats: Arc::new(EngineStats::default()), reply: None }
        }
    }

    #[async_trait::async_trait]
    impl EngineLoader for MockLoader {
        async fn load(&self, _model: &LocalModel) -> Result<Box<dyn LanguageEngine>, InferenceError> {
            self.stats.loads.fetch_add(1, Ordering::SeqCst);
            let live = self.stats.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.stats.max_live.fetch_max(live, Ordering::SeqCst);
            Ok(Box::new(MockEngine { stats: self.stats.clone(), reply: self.reply.clone() }))
        }
    }

    pub struct MockEngine {
        stats: Arc<EngineStats>,
        reply: Option<String>,
    }

    impl Drop for MockEngine {
        fn drop(&mut self) {
            self.stats.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl LanguageEngine for MockEngine {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError> {
            self.stats.requests.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| InferenceError::Request("engine crashed".into()))
        }
    }

    /// Unique scratch directory under the system temp dir.
    #[must_use]
    pub fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tutor-core-{label}-{}", uuid::Uuid::new_v4()))
    }

    /// A session manager over a fresh temp cache and the given loader.
    #[must_use]
    pub fn manager_with(loader: MockLoader, fetcher: Arc<dyn ArtifactFetcher>) -> (SessionManager, Arc<EngineStats>, PathBuf) {
        let dir = temp_dir("models");
        let stats = loader.stats.clone();
        let manager = SessionManager::new(ModelProvisioner::new(dir.clone(), fetcher), Arc::new(loader));
        (manager, stats, dir)
    }
}
