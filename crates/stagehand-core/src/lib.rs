//! Stagehand micro-frontend orchestration core
//!
//! A runtime that registers independently built sub-applications into a
//! host page, loads each one's entry content, and drives it through a
//! strict async lifecycle (load → bootstrap → mount → unmount) while
//! coordinating cross-application exclusion and pluggable isolation.
//!
//! # Architecture
//!
//! Orchestration logic in this crate is decoupled from every I/O concern.
//! Entry fetching, rendering, isolation internals, and the location router
//! are external collaborators reached only through the contracts in
//! [`entry`], [`app`], [`sandbox`], and [`router`]; a test harness can
//! substitute all of them and observe exact lifecycle interleavings.
//!
//! Everything shared across application boundaries lives on one explicit
//! [`Orchestrator`] context: the registry, the frozen configuration, the
//! startup barrier, and the single swap-gate reference that serializes
//! displayed windows under singular mode. Scheduling is single-threaded
//! cooperative; concurrency is interleaved suspension, never parallel
//! execution of orchestrator logic, and no operation is cancelled or
//! retried once started.
//!
//! # Components
//!
//! - [`gate`]: one-shot synchronization gate with external settlement
//! - [`hooks`]: five-stage lifecycle hook chains (add-on before caller)
//! - [`config`]: process-wide configuration and startup options
//! - [`orchestrator`]: registry, startup barrier, shared context
//! - [`lifecycle`]: the per-application mount/unmount sequencer
//! - [`app`], [`entry`], [`sandbox`], [`router`]: collaborator contracts
//! - [`error`]: orchestration error taxonomy

pub mod app;
pub mod config;
pub mod entry;
pub mod error;
pub mod gate;
pub mod hooks;
pub mod lifecycle;
pub mod orchestrator;
pub mod router;
pub mod sandbox;

pub use app::{ActiveRule, AppDescriptor, RenderFrame, Renderer};
pub use config::{
    FrameworkConfig, LoaderOptions, Prefetch, SandboxMode, SingularRule, StartOptions,
    TemplateTransform,
};
pub use entry::{EntryLoader, LifecycleBundle, LifecycleFn, LifecyclePhase, LoadedEntry, ScriptSet};
pub use error::{BoxError, GateError, OrchestratorError};
pub use gate::Gate;
pub use hooks::{HookFn, LifecycleHooks, Stage};
pub use lifecycle::AppHandle;
pub use orchestrator::{Collaborators, Orchestrator};
pub use router::{AppLoader, Prefetcher, RouteRegistration, Router};
pub use sandbox::{
    MemoryScope, PassthroughSandbox, Sandbox, SandboxCapability, SandboxFactory, ScopeHandle,
};
