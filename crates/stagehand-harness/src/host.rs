//! Assembled simulation host.
//!
//! Bundles an [`Orchestrator`] with one of every simulated collaborator,
//! all recording into a single [`EventLog`], so integration tests read as:
//! build host, register apps, start, drive loads, assert on the log.

use std::sync::Arc;

use stagehand_core::{
    app::{ActiveRule, AppDescriptor},
    entry::EntryLoader,
    error::OrchestratorError,
    lifecycle::AppHandle,
    orchestrator::{Collaborators, Orchestrator},
    router::{Prefetcher, Router},
    sandbox::SandboxCapability,
};

use crate::{
    recorder::EventLog,
    sim_loader::{SimEntry, SimLoader},
    sim_render::RecordingRenderer,
    sim_router::{SimPrefetcher, SimRouter},
    sim_sandbox::SimSandboxFactory,
};

/// An orchestrator wired to simulated collaborators.
pub struct SimHost {
    /// The shared event log every collaborator records into.
    pub log: EventLog,
    /// The scripted entry loader.
    pub loader: Arc<SimLoader>,
    /// The recording router.
    pub router: Arc<SimRouter>,
    /// The recording prefetcher.
    pub prefetcher: Arc<SimPrefetcher>,
    /// The orchestrator under test.
    pub orchestrator: Orchestrator,
}

impl SimHost {
    /// A host with full proxy isolation capability.
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(|log| SimSandboxFactory::new(log.clone()))
    }

    /// A host whose sandbox factory advertises `capability`.
    #[must_use]
    pub fn with_capability(capability: SandboxCapability) -> Self {
        Self::with_factory(|log| SimSandboxFactory::new(log.clone()).with_capability(capability))
    }

    /// A host with a custom-built sandbox factory.
    pub fn with_factory(factory: impl FnOnce(&EventLog) -> SimSandboxFactory) -> Self {
        let log = EventLog::new();
        let loader = Arc::new(SimLoader::new(log.clone()));
        let router = Arc::new(SimRouter::new(log.clone()));
        let prefetcher = Arc::new(SimPrefetcher::new(log.clone()));
        let sandboxes = Arc::new(factory(&log));

        let orchestrator = Orchestrator::new(Collaborators {
            entry_loader: Arc::clone(&loader) as Arc<dyn EntryLoader>,
            router: Arc::clone(&router) as Arc<dyn Router>,
            sandboxes,
            prefetcher: Some(Arc::clone(&prefetcher) as Arc<dyn Prefetcher>),
        });

        Self { log, loader, router, prefetcher, orchestrator }
    }

    /// A descriptor whose renderer records into the shared log and whose
    /// entry locator is `//sim/{name}`.
    #[must_use]
    pub fn app(&self, name: &str) -> AppDescriptor {
        AppDescriptor::new(
            name,
            Self::entry(name),
            Arc::new(RecordingRenderer::new(self.log.clone(), name)),
            ActiveRule::Prefix(format!("/{name}")),
        )
    }

    /// The entry locator [`Self::app`] uses for `name`.
    #[must_use]
    pub fn entry(name: &str) -> String {
        format!("//sim/{name}")
    }

    /// Script the entry behind [`Self::app`]`(name)`.
    pub fn script(&self, name: &str, script: SimEntry) {
        self.loader.script(Self::entry(name), script);
    }

    /// Run the loader the router holds for `name`.
    ///
    /// # Errors
    ///
    /// Propagates the load-phase failure.
    ///
    /// # Panics
    ///
    /// Panics if `name` was never registered.
    #[allow(clippy::expect_used)]
    pub async fn load(&self, name: &str) -> Result<AppHandle, OrchestratorError> {
        let loader = self.router.loader(name).expect("application registered with router");
        loader().await
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}
