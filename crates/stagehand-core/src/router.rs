//! Router and prefetch collaborator contracts.
//!
//! The single-instance router matching locations against activity rules and
//! driving bootstrap/mount/unmount at the right time is external. The
//! orchestrator hands it one [`RouteRegistration`] per accepted descriptor
//! and calls [`Router::start`] during startup.

use std::{fmt, sync::Arc};

use futures::future::BoxFuture;

use crate::{
    app::AppDescriptor, config::LoaderOptions, error::OrchestratorError, lifecycle::AppHandle,
};

/// Loader closure installed with the router for one application.
///
/// Each invocation runs the full load phase (framework-gate await, entry
/// load, script execution, lifecycle resolution) and yields the handle the
/// router drives through bootstrap, mount, and unmount.
pub type AppLoader =
    Arc<dyn Fn() -> BoxFuture<'static, Result<AppHandle, OrchestratorError>> + Send + Sync>;

/// One application wired into the router.
pub struct RouteRegistration {
    /// The registered descriptor (name, activity rule, props).
    pub app: Arc<AppDescriptor>,
    /// Loader producing the application's lifecycle handle.
    pub loader: AppLoader,
}

impl fmt::Debug for RouteRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegistration").field("app", &self.app).finish_non_exhaustive()
    }
}

/// The external application router.
pub trait Router: Send + Sync {
    /// Install a registration. Called once per accepted descriptor, in
    /// registration order.
    fn register(&self, registration: RouteRegistration);

    /// Begin routing. Called exactly once, during startup, before the
    /// framework gate opens.
    fn start(&self);
}

/// The external prefetch collaborator.
///
/// Triggered once during startup with the registered applications selected
/// by the prefetch policy. Fire-and-forget; prefetch failures never affect
/// orchestration.
pub trait Prefetcher: Send + Sync {
    /// Warm caches for the given applications.
    fn prefetch(&self, apps: Vec<Arc<AppDescriptor>>, options: &LoaderOptions);
}
