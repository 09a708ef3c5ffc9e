//! Simulated isolation adapters.
//!
//! Each created sandbox owns a fresh [`MemoryScope`] and records its
//! creation and activate/deactivate calls. The factory's advertised
//! capability is configurable so tests can exercise the startup downgrade
//! path.

use std::sync::Arc;

use async_trait::async_trait;
use stagehand_core::{
    error::BoxError,
    hooks::LifecycleHooks,
    sandbox::{MemoryScope, Sandbox, SandboxCapability, SandboxFactory, ScopeHandle},
};

use crate::recorder::EventLog;

struct SimSandbox {
    name: String,
    scope: Arc<MemoryScope>,
    addon: LifecycleHooks,
    log: EventLog,
}

#[async_trait]
impl Sandbox for SimSandbox {
    fn scope(&self) -> Arc<dyn ScopeHandle> {
        Arc::clone(&self.scope) as Arc<dyn ScopeHandle>
    }

    fn addon_hooks(&self) -> LifecycleHooks {
        self.addon.clone()
    }

    async fn activate(&self) -> Result<(), BoxError> {
        self.log.record(format!("sandbox:activate:{}", self.name));
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), BoxError> {
        self.log.record(format!("sandbox:deactivate:{}", self.name));
        Ok(())
    }
}

/// Recording [`SandboxFactory`] with a configurable capability.
pub struct SimSandboxFactory {
    log: EventLog,
    capability: SandboxCapability,
    addon: LifecycleHooks,
}

impl SimSandboxFactory {
    /// A factory advertising full proxy isolation.
    #[must_use]
    pub fn new(log: EventLog) -> Self {
        Self { log, capability: SandboxCapability::Proxy, addon: LifecycleHooks::new() }
    }

    /// Override the advertised capability.
    #[must_use]
    pub fn with_capability(mut self, capability: SandboxCapability) -> Self {
        self.capability = capability;
        self
    }

    /// Hooks every created sandbox contributes to the lifecycle chains.
    #[must_use]
    pub fn with_addon_hooks(mut self, addon: LifecycleHooks) -> Self {
        self.addon = addon;
        self
    }
}

impl SandboxFactory for SimSandboxFactory {
    fn capability(&self) -> SandboxCapability {
        self.capability
    }

    fn create(&self, app_name: &str, exclusive: bool) -> Arc<dyn Sandbox> {
        self.log.record(format!("sandbox:create:{app_name}:exclusive={exclusive}"));
        Arc::new(SimSandbox {
            name: app_name.to_owned(),
            scope: Arc::new(MemoryScope::new()),
            addon: self.addon.clone(),
            log: self.log.clone(),
        })
    }
}
