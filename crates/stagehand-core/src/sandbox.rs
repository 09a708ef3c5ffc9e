//! Isolation adapter contract.
//!
//! The concrete isolation mechanism is external; the orchestrator only
//! depends on this contract: a per-application scope object substituting
//! for the shared global scope, async activate/deactivate operations framing
//! the application's displayed window, and optionally a set of add-on hooks
//! the adapter contributes to the lifecycle chains.
//!
//! When isolation is disabled the sequencer falls back to
//! [`PassthroughSandbox`], which shares one ambient scope and performs no
//! isolation at all.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    entry::{LifecycleFn, LifecyclePhase},
    error::BoxError,
    hooks::LifecycleHooks,
};

/// What the host's isolation primitive can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxCapability {
    /// Dynamic property-trap proxying is available; multiple applications
    /// may be displayed concurrently, each behind its own proxy scope.
    Proxy,
    /// Only the constrained snapshot variant is available. Snapshot
    /// isolation records and restores the shared scope wholesale, so it
    /// cannot support non-exclusive display; startup forces singular mode
    /// when it has to downgrade to this variant.
    Snapshot,
}

/// The substitute global scope an application executes inside.
///
/// Script execution may export lifecycle functions onto the scope; the
/// sequencer consults those exports as the documented fallback when the
/// execution result itself lacks a lifecycle.
pub trait ScopeHandle: Send + Sync {
    /// Install an export on the scope.
    fn export(&self, phase: LifecyclePhase, lifecycle: LifecycleFn);

    /// Look up a previously installed export.
    fn exported(&self, phase: LifecyclePhase) -> Option<LifecycleFn>;
}

/// Table-backed [`ScopeHandle`].
///
/// The built-in scope used by [`PassthroughSandbox`]; also a convenient
/// building block for adapter implementations.
#[derive(Default)]
pub struct MemoryScope {
    exports: Mutex<[Option<LifecycleFn>; 3]>,
}

impl MemoryScope {
    /// An empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(phase: LifecyclePhase) -> usize {
        match phase {
            LifecyclePhase::Bootstrap => 0,
            LifecyclePhase::Mount => 1,
            LifecyclePhase::Unmount => 2,
        }
    }
}

impl ScopeHandle for MemoryScope {
    fn export(&self, phase: LifecyclePhase, lifecycle: LifecycleFn) {
        self.exports.lock()[Self::slot(phase)] = Some(lifecycle);
    }

    fn exported(&self, phase: LifecyclePhase) -> Option<LifecycleFn> {
        self.exports.lock()[Self::slot(phase)].clone()
    }
}

/// A per-application isolation adapter instance.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// The scope the application's scripts execute inside.
    fn scope(&self) -> Arc<dyn ScopeHandle>;

    /// Lifecycle hooks this adapter contributes.
    ///
    /// Composed ahead of caller hooks for every stage.
    fn addon_hooks(&self) -> LifecycleHooks {
        LifecycleHooks::new()
    }

    /// Begin isolating: called during mount, before the application's own
    /// `mount` runs.
    async fn activate(&self) -> Result<(), BoxError>;

    /// Stop isolating: called during unmount, after the application's own
    /// `unmount` ran.
    async fn deactivate(&self) -> Result<(), BoxError>;
}

/// Creates isolation adapters per application.
pub trait SandboxFactory: Send + Sync {
    /// The strongest isolation variant the host supports.
    fn capability(&self) -> SandboxCapability;

    /// Create an adapter for `app_name`.
    ///
    /// `exclusive` is true when the application runs under singular mode,
    /// i.e. it will never share its displayed window with another
    /// application.
    fn create(&self, app_name: &str, exclusive: bool) -> Arc<dyn Sandbox>;
}

/// No-isolation adapter used when sandboxing is disabled.
///
/// Contributes no hooks and its activate/deactivate operations are no-ops.
/// The orchestrator hands every disabled-mode application a passthrough
/// over the same ambient [`MemoryScope`], so scope exports from one
/// application's script pass are visible to every other.
#[derive(Default)]
pub struct PassthroughSandbox {
    scope: Arc<MemoryScope>,
}

impl PassthroughSandbox {
    /// A passthrough adapter with a fresh ambient scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A passthrough adapter sharing an existing ambient scope.
    #[must_use]
    pub fn over(scope: Arc<MemoryScope>) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Sandbox for PassthroughSandbox {
    fn scope(&self) -> Arc<dyn ScopeHandle> {
        Arc::clone(&self.scope) as Arc<dyn ScopeHandle>
    }

    async fn activate(&self) -> Result<(), BoxError> {
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), BoxError> {
        Ok(())
    }
}
