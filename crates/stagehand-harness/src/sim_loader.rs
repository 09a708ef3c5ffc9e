//! Simulated entry loader.
//!
//! Scripted stand-in for the external entry loader: each entry locator maps
//! to a [`SimEntry`] describing which lifecycle functions its "scripts"
//! provide and how (directly from execution, or exported onto the isolation
//! scope), plus an optional gate the mount lifecycle parks on so tests can
//! hold an application inside its displayed window.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;
use stagehand_core::{
    config::LoaderOptions,
    entry::{EntryLoader, LifecycleBundle, LifecycleFn, LifecyclePhase, LoadedEntry, ScriptSet},
    error::BoxError,
    gate::Gate,
    sandbox::ScopeHandle,
};

use crate::recorder::EventLog;

/// Script behavior for one simulated entry.
#[derive(Debug, Clone, Default)]
pub struct SimEntry {
    /// Lifecycles returned directly by script execution.
    pub direct: Vec<LifecyclePhase>,
    /// Lifecycles exported onto the isolation scope instead.
    pub via_scope: Vec<LifecyclePhase>,
    /// Gate the `mount` lifecycle waits on before completing, letting a
    /// test keep the application mid-mount.
    pub hold_mount: Option<Gate>,
}

impl SimEntry {
    /// An entry exporting all three lifecycles directly.
    #[must_use]
    pub fn complete() -> Self {
        Self { direct: LifecyclePhase::ALL.to_vec(), ..Self::default() }
    }

    /// Keep the `mount` lifecycle parked on `gate`.
    #[must_use]
    pub fn hold_mount_on(mut self, gate: Gate) -> Self {
        self.hold_mount = Some(gate);
        self
    }
}

struct SimScripts {
    entry: String,
    script: SimEntry,
    log: EventLog,
}

fn lifecycle(log: &EventLog, phase: LifecyclePhase, hold: Option<Gate>) -> LifecycleFn {
    let log = log.clone();
    Arc::new(move |app| {
        let log = log.clone();
        let hold = hold.clone();
        Box::pin(async move {
            log.record(format!("{}:{}", phase.name(), app.name));
            if let Some(gate) = hold {
                gate.opened().await.map_err(|e| Box::new(e) as BoxError)?;
            }
            Ok(())
        })
    })
}

#[async_trait]
impl ScriptSet for SimScripts {
    async fn execute(
        &self,
        scope: &dyn ScopeHandle,
        shared_timeline: bool,
    ) -> Result<LifecycleBundle, BoxError> {
        self.log.record(format!("execute:{}:shared={shared_timeline}", self.entry));

        let mut bundle = LifecycleBundle::default();
        for phase in LifecyclePhase::ALL {
            let hold = (phase == LifecyclePhase::Mount)
                .then(|| self.script.hold_mount.clone())
                .flatten();
            if self.script.direct.contains(&phase) {
                bundle.set(phase, lifecycle(&self.log, phase, hold));
            } else if self.script.via_scope.contains(&phase) {
                scope.export(phase, lifecycle(&self.log, phase, hold));
            }
        }
        Ok(bundle)
    }
}

/// Scripted [`EntryLoader`].
///
/// Entries not explicitly scripted behave as [`SimEntry::complete`].
pub struct SimLoader {
    log: EventLog,
    entries: Mutex<HashMap<String, SimEntry>>,
}

impl SimLoader {
    /// A loader recording into `log`.
    #[must_use]
    pub fn new(log: EventLog) -> Self {
        Self { log, entries: Mutex::new(HashMap::new()) }
    }

    /// Script the behavior of one entry locator.
    pub fn script(&self, entry: impl Into<String>, script: SimEntry) {
        self.entries.lock().insert(entry.into(), script);
    }
}

#[async_trait]
impl EntryLoader for SimLoader {
    async fn load(&self, entry: &str, options: &LoaderOptions) -> Result<LoadedEntry, BoxError> {
        self.log.record(format!("load:{entry}"));

        let script = self.entries.lock().get(entry).cloned().unwrap_or_else(SimEntry::complete);
        let raw = format!("<main data-entry=\"{entry}\"></main>");

        Ok(LoadedEntry {
            content: options.apply(raw),
            asset_base: format!("{entry}/assets/"),
            scripts: Arc::new(SimScripts {
                entry: entry.to_owned(),
                script,
                log: self.log.clone(),
            }),
        })
    }
}
