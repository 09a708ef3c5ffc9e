//! Entry loader contract and application lifecycle exports.
//!
//! Fetching and parsing an application's remote entry document is an
//! external concern; the orchestrator only depends on this contract. A
//! loaded entry exposes its displayable content plus a [`ScriptSet`] whose
//! execution inside an isolation scope yields the application's lifecycle
//! functions.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::{app::AppDescriptor, config::LoaderOptions, error::BoxError, sandbox::ScopeHandle};

/// The three lifecycle functions every application must export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// One-time initialization after load.
    Bootstrap,
    /// Bring the application onto the stage.
    Mount,
    /// Remove the application from the stage.
    Unmount,
}

impl LifecyclePhase {
    /// All phases, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Bootstrap, Self::Mount, Self::Unmount];

    /// Stable phase name, matching the export name applications use.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Mount => "mount",
            Self::Unmount => "unmount",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An application-exported lifecycle function.
///
/// Invoked with the application's descriptor (name, props); resolves when
/// the phase's work completes.
pub type LifecycleFn =
    Arc<dyn Fn(Arc<AppDescriptor>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Lifecycle functions produced directly by script execution.
///
/// Any of the three may be absent; the sequencer then consults the
/// isolation scope for a same-named export before rejecting the load.
#[derive(Default, Clone)]
pub struct LifecycleBundle {
    /// Direct `bootstrap` export, if any.
    pub bootstrap: Option<LifecycleFn>,
    /// Direct `mount` export, if any.
    pub mount: Option<LifecycleFn>,
    /// Direct `unmount` export, if any.
    pub unmount: Option<LifecycleFn>,
}

impl LifecycleBundle {
    /// The direct export for `phase`, if present.
    #[must_use]
    pub fn phase(&self, phase: LifecyclePhase) -> Option<LifecycleFn> {
        match phase {
            LifecyclePhase::Bootstrap => self.bootstrap.clone(),
            LifecyclePhase::Mount => self.mount.clone(),
            LifecyclePhase::Unmount => self.unmount.clone(),
        }
    }

    /// Install an export for `phase`.
    pub fn set(&mut self, phase: LifecyclePhase, lifecycle: LifecycleFn) {
        match phase {
            LifecyclePhase::Bootstrap => self.bootstrap = Some(lifecycle),
            LifecyclePhase::Mount => self.mount = Some(lifecycle),
            LifecyclePhase::Unmount => self.unmount = Some(lifecycle),
        }
    }
}

impl fmt::Debug for LifecycleBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleBundle")
            .field("bootstrap", &self.bootstrap.is_some())
            .field("mount", &self.mount.is_some())
            .field("unmount", &self.unmount.is_some())
            .finish()
    }
}

/// The executable scripts extracted from a loaded entry.
#[async_trait]
pub trait ScriptSet: Send + Sync {
    /// Execute the scripts within `scope`.
    ///
    /// `shared_timeline` is true when the application may share the stage
    /// with others (the inverse of singular mode); implementations use it
    /// to decide how strictly the scope substitutes for the host's global
    /// scope. Execution may export lifecycles onto `scope` instead of (or
    /// in addition to) returning them directly.
    async fn execute(
        &self,
        scope: &dyn ScopeHandle,
        shared_timeline: bool,
    ) -> Result<LifecycleBundle, BoxError>;
}

/// A successfully loaded entry.
pub struct LoadedEntry {
    /// Displayable content, already passed through the template transform.
    pub content: String,
    /// Base path the application's relative assets resolve against.
    pub asset_base: String,
    /// The entry's executable scripts.
    pub scripts: Arc<dyn ScriptSet>,
}

impl fmt::Debug for LoadedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedEntry")
            .field("content", &self.content)
            .field("asset_base", &self.asset_base)
            .finish_non_exhaustive()
    }
}

/// Loads an application's entry document.
///
/// External collaborator; the orchestrator passes the entry locator from
/// the descriptor plus the effective loader options (including the composed
/// template transform) and treats everything else as opaque.
#[async_trait]
pub trait EntryLoader: Send + Sync {
    /// Fetch and parse the entry behind `entry`.
    async fn load(&self, entry: &str, options: &LoaderOptions) -> Result<LoadedEntry, BoxError>;
}
