//! Orchestration error types.
//!
//! Failure classes map directly to the taxonomy the router has to care
//! about: a contract violation ([`OrchestratorError::MissingLifecycles`])
//! rejects the load before a mount is ever scheduled, while hook, render,
//! sandbox, and lifecycle failures abort the remaining steps of the
//! sequence they occur in. Nothing here is retried; recovery is the
//! caller's decision.

use thiserror::Error;

use crate::{entry::LifecyclePhase, hooks::Stage};

/// Error type collaborator contracts report failures with.
///
/// Collaborators (entry loaders, renderers, sandboxes, hooks, application
/// lifecycles) are caller-supplied, so their failures are opaque to the
/// core. The sequencer wraps them with app and step context.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`Gate`](crate::gate::Gate) waiters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// The gate was settled with a rejection.
    #[error("gate faulted: {0}")]
    Faulted(String),

    /// Every handle to the gate was dropped while it was still pending,
    /// so it can never settle.
    #[error("gate abandoned before settling")]
    Abandoned,
}

/// Errors produced by the orchestration core.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A loader body observed an open framework gate without a frozen
    /// configuration. Cannot happen through the public API; kept explicit
    /// instead of panicking.
    #[error("framework configuration missing after startup gate opened")]
    NotStarted,

    /// Waiting on a synchronization gate failed.
    #[error("synchronization gate failed")]
    Gate(#[from] GateError),

    /// The external entry loader rejected the application's entry.
    #[error("entry load for `{app}` failed")]
    Entry {
        /// Application name.
        app: String,
        /// Loader failure.
        #[source]
        source: BoxError,
    },

    /// Executing the application's bundled scripts failed.
    #[error("script execution for `{app}` failed")]
    Execute {
        /// Application name.
        app: String,
        /// Execution failure.
        #[source]
        source: BoxError,
    },

    /// The per-application render callback rejected.
    #[error("render for `{app}` failed")]
    Render {
        /// Application name.
        app: String,
        /// Renderer failure.
        #[source]
        source: BoxError,
    },

    /// A lifecycle stage hook rejected, aborting its chain.
    #[error("{stage} hook for `{app}` failed")]
    Hook {
        /// Stage whose chain was running.
        stage: Stage,
        /// Application name.
        app: String,
        /// Hook failure.
        #[source]
        source: BoxError,
    },

    /// The isolation adapter failed to activate or deactivate.
    #[error("sandbox {op} for `{app}` failed")]
    Sandbox {
        /// Application name.
        app: String,
        /// Which adapter operation failed (`"activate"` or `"deactivate"`).
        op: &'static str,
        /// Adapter failure.
        #[source]
        source: BoxError,
    },

    /// One of the application's own lifecycle functions rejected.
    #[error("{phase} of `{app}` failed")]
    Lifecycle {
        /// Application name.
        app: String,
        /// Which lifecycle function rejected.
        phase: LifecyclePhase,
        /// Lifecycle failure.
        #[source]
        source: BoxError,
    },

    /// Contract violation: after script execution and the scope fallback,
    /// the application still lacks one or more of `bootstrap`, `mount`,
    /// `unmount`. The load is rejected and the application is never
    /// mounted.
    #[error("application `{app}` exposes no {missing:?} lifecycle(s)")]
    MissingLifecycles {
        /// Application name.
        app: String,
        /// The lifecycle functions that could not be resolved.
        missing: Vec<LifecyclePhase>,
    },
}
