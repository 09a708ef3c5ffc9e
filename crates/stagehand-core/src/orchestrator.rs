//! The orchestrator context: registry, configuration, and startup.
//!
//! One [`Orchestrator`] owns everything the lifecycle machinery shares: the
//! registered descriptors, the frozen framework configuration, the startup
//! gate, and the single current swap-gate slot. There is no hidden global
//! state; everything shared across application boundaries lives here.

use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    app::AppDescriptor,
    config::{FrameworkConfig, Prefetch, SandboxMode, SingularRule, StartOptions},
    entry::EntryLoader,
    gate::Gate,
    hooks::LifecycleHooks,
    lifecycle::load_app,
    router::{AppLoader, Prefetcher, RouteRegistration, Router},
    sandbox::{MemoryScope, SandboxCapability, SandboxFactory},
};

/// The external collaborators the orchestrator delegates to.
pub struct Collaborators {
    /// Fetches and parses entry documents.
    pub entry_loader: Arc<dyn EntryLoader>,
    /// Matches locations to applications and drives their lifecycles.
    pub router: Arc<dyn Router>,
    /// Creates per-application isolation adapters.
    pub sandboxes: Arc<dyn SandboxFactory>,
    /// Optional cache warmer for not-yet-active applications.
    pub prefetcher: Option<Arc<dyn Prefetcher>>,
}

/// Shared orchestration state.
///
/// The swap-gate slot is the only state the orchestrator itself mutates
/// across application boundaries; only the sequencer writes it, and always
/// between suspension points (the lock is never held across an await). The
/// ambient scope is shared by every application when isolation is off;
/// applications mutate it through their own script exports.
pub(crate) struct Context {
    pub(crate) apps: Mutex<Vec<Arc<AppDescriptor>>>,
    pub(crate) config: OnceLock<FrameworkConfig>,
    pub(crate) start_gate: Gate,
    pub(crate) swap_gate: Mutex<Option<Gate>>,
    pub(crate) active: AtomicBool,
    pub(crate) ambient_scope: Arc<MemoryScope>,
    pub(crate) entry_loader: Arc<dyn EntryLoader>,
    pub(crate) router: Arc<dyn Router>,
    pub(crate) sandboxes: Arc<dyn SandboxFactory>,
    pub(crate) prefetcher: Option<Arc<dyn Prefetcher>>,
}

/// The micro-frontend lifecycle orchestrator.
///
/// Registers independently built applications, loads their entries, and
/// drives each through load → bootstrap → mount → unmount while
/// coordinating cross-application exclusion and pluggable isolation.
#[derive(Clone)]
pub struct Orchestrator {
    ctx: Arc<Context>,
}

impl Orchestrator {
    /// Create an orchestrator around its external collaborators.
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators { entry_loader, router, sandboxes, prefetcher } = collaborators;
        Self {
            ctx: Arc::new(Context {
                apps: Mutex::new(Vec::new()),
                config: OnceLock::new(),
                start_gate: Gate::new(),
                swap_gate: Mutex::new(None),
                active: AtomicBool::new(false),
                ambient_scope: Arc::new(MemoryScope::new()),
                entry_loader,
                router,
                sandboxes,
                prefetcher,
            }),
        }
    }

    /// Register applications, wiring a loader closure into the router for
    /// each.
    ///
    /// Idempotent and order-preserving: a descriptor whose name is already
    /// registered is silently dropped, never an error. The `caller_hooks`
    /// are shared by every application in this batch and run after any
    /// add-on hooks the isolation adapter contributes; pass an empty set
    /// when no hooks are wanted.
    ///
    /// Registration is legal before [`start`](Self::start); the installed
    /// loaders perform no work until startup opens the framework gate.
    pub fn register(
        &self,
        descriptors: impl IntoIterator<Item = AppDescriptor>,
        caller_hooks: LifecycleHooks,
    ) {
        let caller_hooks = Arc::new(caller_hooks);
        let mut accepted = Vec::new();
        {
            let mut apps = self.ctx.apps.lock();
            for descriptor in descriptors {
                if apps.iter().any(|existing| existing.name == descriptor.name) {
                    debug!(app = %descriptor.name, "already registered, ignoring");
                    continue;
                }
                let app = Arc::new(descriptor);
                apps.push(Arc::clone(&app));
                accepted.push(app);
            }
        }

        // Router wiring happens outside the registry lock.
        for app in accepted {
            let loader = self.loader_for(&app, &caller_hooks);
            self.ctx.router.register(RouteRegistration { app, loader });
        }
    }

    /// Start the framework.
    ///
    /// Freezes the process-wide configuration, triggers prefetching,
    /// starts the router, marks the orchestrator active, and finally opens
    /// the framework gate, releasing every loader parked on it. The gate
    /// is forward-only; a second call warns and has no effect.
    ///
    /// If isolation is requested but the host lacks the proxy primitive,
    /// the policy degrades rather than fails: sandboxing downgrades to the
    /// snapshot variant and singular mode is forced on, with warnings.
    pub fn start(&self, options: StartOptions) {
        let StartOptions { prefetch, sandbox, singular, loader } = options;

        let capability = self.ctx.sandboxes.capability();
        let mode = SandboxMode::effective(sandbox, capability);
        if sandbox && capability == SandboxCapability::Snapshot {
            warn!("proxy isolation unavailable, downgrading to snapshot sandbox");
        }
        let singular = if mode == SandboxMode::Snapshot {
            if !matches!(singular, SingularRule::Always) {
                warn!("snapshot sandbox cannot support concurrent display, forcing singular mode");
            }
            SingularRule::Always
        } else {
            singular
        };

        let config = FrameworkConfig { singular, sandbox: mode, loader: loader.clone() };
        if self.ctx.config.set(config).is_err() {
            warn!("start() called more than once, ignoring");
            return;
        }

        if prefetch != Prefetch::Disabled {
            if let Some(prefetcher) = &self.ctx.prefetcher {
                let selected = prefetch.select(&self.ctx.apps.lock());
                prefetcher.prefetch(selected, &loader);
            }
        }

        self.ctx.router.start();
        self.ctx.active.store(true, Ordering::Release);
        self.ctx.start_gate.open();
    }

    /// Whether [`start`](Self::start) has run.
    ///
    /// The host-environment flag applications can consult to detect they
    /// are running under the orchestrator.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.ctx.active.load(Ordering::Acquire)
    }

    /// The registered descriptors, in registration order.
    #[must_use]
    pub fn registered(&self) -> Vec<Arc<AppDescriptor>> {
        self.ctx.apps.lock().clone()
    }

    fn loader_for(&self, app: &Arc<AppDescriptor>, caller_hooks: &Arc<LifecycleHooks>) -> AppLoader {
        let ctx = Arc::clone(&self.ctx);
        let app = Arc::clone(app);
        let caller_hooks = Arc::clone(caller_hooks);
        Arc::new(move || {
            Box::pin(load_app(Arc::clone(&ctx), Arc::clone(&app), Arc::clone(&caller_hooks)))
        })
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registered", &self.ctx.apps.lock().len())
            .field("started", &self.ctx.start_gate.is_settled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        config::LoaderOptions,
        entry::{EntryLoader, LoadedEntry},
        error::BoxError,
        sandbox::{PassthroughSandbox, Sandbox},
    };

    struct NullLoader;

    #[async_trait]
    impl EntryLoader for NullLoader {
        async fn load(
            &self,
            entry: &str,
            _options: &LoaderOptions,
        ) -> Result<LoadedEntry, BoxError> {
            Err(format!("no entry behind {entry}").into())
        }
    }

    struct RecordingRouter {
        registered: Mutex<Vec<String>>,
    }

    impl Router for RecordingRouter {
        fn register(&self, registration: RouteRegistration) {
            self.registered.lock().push(registration.app.name.clone());
        }

        fn start(&self) {}
    }

    struct NullSandboxes;

    impl SandboxFactory for NullSandboxes {
        fn capability(&self) -> SandboxCapability {
            SandboxCapability::Proxy
        }

        fn create(&self, _app_name: &str, _exclusive: bool) -> Arc<dyn Sandbox> {
            Arc::new(PassthroughSandbox::new())
        }
    }

    fn orchestrator() -> (Orchestrator, Arc<RecordingRouter>) {
        let router = Arc::new(RecordingRouter { registered: Mutex::new(Vec::new()) });
        let orchestrator = Orchestrator::new(Collaborators {
            entry_loader: Arc::new(NullLoader),
            router: Arc::clone(&router) as Arc<dyn Router>,
            sandboxes: Arc::new(NullSandboxes),
            prefetcher: None,
        });
        (orchestrator, router)
    }

    #[test]
    fn duplicate_names_are_dropped() {
        let (orchestrator, router) = orchestrator();

        orchestrator.register(
            [AppDescriptor::for_tests("orders"), AppDescriptor::for_tests("billing")],
            LifecycleHooks::new(),
        );
        orchestrator.register([AppDescriptor::for_tests("orders")], LifecycleHooks::new());

        let names: Vec<_> =
            orchestrator.registered().iter().map(|app| app.name.clone()).collect();
        assert_eq!(names, vec!["orders", "billing"]);

        // The duplicate never reached the router either.
        assert_eq!(*router.registered.lock(), vec!["orders", "billing"]);
    }
}
