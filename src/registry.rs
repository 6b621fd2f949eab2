//! Actor registry keyed by sanitized URL.
//!
//! Requests for the same page (after sanitization) share one actor and
//! therefore one browser session; distinct pages get independent lifecycles.

use std::sync::Arc;

use artifact_store::ObjectStore;
use browser_session::BrowserLauncher;
use dashmap::DashMap;
use tracing::info;

use crate::actor::{self, ActorHandle};
use crate::config::CaptureSettings;
use crate::controller::SessionLifecycleController;

/// Produces one launcher per actor; the server installs the Chromium-backed
/// one, tests install counting fakes.
pub type LauncherFactory = Arc<dyn Fn() -> Box<dyn BrowserLauncher> + Send + Sync>;

pub struct ActorRegistry {
    actors: DashMap<String, ActorHandle>,
    factory: LauncherFactory,
    store: Arc<dyn ObjectStore>,
    settings: CaptureSettings,
}

impl ActorRegistry {
    pub fn new(
        factory: LauncherFactory,
        store: Arc<dyn ObjectStore>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            actors: DashMap::new(),
            factory,
            store,
            settings,
        }
    }

    /// Returns the actor for `subject`, spawning it on first use. The entry
    /// guard keeps two concurrent first requests from spawning twice.
    pub fn get_or_spawn(&self, subject: &str) -> ActorHandle {
        self.actors
            .entry(subject.to_string())
            .or_insert_with(|| {
                info!(subject, "spawning capture actor");
                let controller = SessionLifecycleController::new(
                    (self.factory)(),
                    self.store.clone(),
                    self.settings,
                );
                actor::spawn(subject.to_string(), controller)
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::FakeLauncher;
    use artifact_store::MemoryObjectStore;

    fn registry(launcher: &FakeLauncher) -> ActorRegistry {
        ActorRegistry::new(
            launcher.factory(),
            Arc::new(MemoryObjectStore::new()),
            CaptureSettings::default(),
        )
    }

    #[tokio::test]
    async fn same_subject_reuses_the_actor() {
        let launcher = FakeLauncher::new();
        let registry = registry(&launcher);

        let _a = registry.get_or_spawn("https___example_com");
        let _b = registry.get_or_spawn("https___example_com");

        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn distinct_subjects_get_distinct_actors() {
        let launcher = FakeLauncher::new();
        let registry = registry(&launcher);

        registry.get_or_spawn("https___example_com");
        registry.get_or_spawn("https___example_org");

        assert_eq!(registry.len(), 2);
    }
}
