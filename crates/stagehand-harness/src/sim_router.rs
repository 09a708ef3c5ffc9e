//! Simulated router and prefetcher.
//!
//! The real router matches locations against activity rules; the simulated
//! one just stores the registrations so tests drive loads explicitly and in
//! whatever interleaving they want to observe.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use stagehand_core::{
    app::AppDescriptor,
    config::LoaderOptions,
    router::{AppLoader, Prefetcher, RouteRegistration, Router},
};

use crate::recorder::EventLog;

/// Recording [`Router`] that stores registrations for tests to drive.
pub struct SimRouter {
    log: EventLog,
    registrations: Mutex<Vec<RouteRegistration>>,
    started: AtomicBool,
}

impl SimRouter {
    /// A router recording into `log`.
    #[must_use]
    pub fn new(log: EventLog) -> Self {
        Self { log, registrations: Mutex::new(Vec::new()), started: AtomicBool::new(false) }
    }

    /// Registered application names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.registrations.lock().iter().map(|r| r.app.name.clone()).collect()
    }

    /// The loader installed for `name`.
    #[must_use]
    pub fn loader(&self, name: &str) -> Option<AppLoader> {
        self.registrations
            .lock()
            .iter()
            .find(|r| r.app.name == name)
            .map(|r| Arc::clone(&r.loader))
    }

    /// Whether the orchestrator has started this router.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

impl Router for SimRouter {
    fn register(&self, registration: RouteRegistration) {
        self.log.record(format!("router:register:{}", registration.app.name));
        self.registrations.lock().push(registration);
    }

    fn start(&self) {
        self.log.record("router:start");
        self.started.store(true, Ordering::Release);
    }
}

/// Recording [`Prefetcher`].
pub struct SimPrefetcher {
    log: EventLog,
    seen: Mutex<Vec<String>>,
}

impl SimPrefetcher {
    /// A prefetcher recording into `log`.
    #[must_use]
    pub fn new(log: EventLog) -> Self {
        Self { log, seen: Mutex::new(Vec::new()) }
    }

    /// Names handed to the last prefetch trigger.
    #[must_use]
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

impl Prefetcher for SimPrefetcher {
    fn prefetch(&self, apps: Vec<Arc<AppDescriptor>>, _options: &LoaderOptions) {
        let names: Vec<String> = apps.iter().map(|app| app.name.clone()).collect();
        self.log.record(format!("prefetch:{}", names.join(",")));
        *self.seen.lock() = names;
    }
}
