//! Deterministic simulation harness for orchestration testing.
//!
//! In-process implementations of every collaborator contract in
//! `stagehand-core` (entry loader, renderer, isolation adapter, router,
//! prefetcher), all recording into one ordered event log, plus a
//! pre-assembled [`SimHost`] bundling them around an orchestrator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod host;
pub mod recorder;
pub mod sim_loader;
pub mod sim_render;
pub mod sim_router;
pub mod sim_sandbox;

pub use host::SimHost;
pub use recorder::{EventLog, log_hook};
pub use sim_loader::{SimEntry, SimLoader};
pub use sim_render::RecordingRenderer;
pub use sim_router::{SimPrefetcher, SimRouter};
pub use sim_sandbox::SimSandboxFactory;
