//! Mount/unmount sequencer.
//!
//! The per-application state machine assembling the ordered async steps for
//! loading, mounting, and unmounting, wiring in rendering, hook chains, and
//! the isolation adapter.
//!
//! # Sequencing
//!
//! All orchestration runs on one cooperative timeline; every hook, render,
//! entry-load, adapter, and gate call is a suspension point. Within one
//! application the steps below execute strictly in order, each awaited
//! before the next, and an error aborts the remainder of the sequence.
//! Across applications the only enforced ordering is the singular-mode gate
//! chain; without singular mode, sequences interleave freely.
//!
//! ```text
//! load:    gate → entry → render(loading) → sandbox → hooks(before_load)
//!          → execute scripts → resolve lifecycles
//! mount:   [await predecessor gate] → render(loading) → before_mount
//!          → sandbox.activate → app.mount → render(ready) → after_mount
//!          → [install new gate]
//! unmount: before_unmount → app.unmount → sandbox.deactivate
//!          → after_unmount → render(empty) → [settle own gate]
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    app::{AppDescriptor, RenderFrame},
    config::SandboxMode,
    entry::{LifecycleBundle, LifecycleFn, LifecyclePhase},
    error::OrchestratorError,
    gate::Gate,
    hooks::{LifecycleHooks, Stage},
    orchestrator::Context,
    sandbox::{PassthroughSandbox, Sandbox, ScopeHandle},
};

/// The three lifecycle functions after resolution.
struct ResolvedLifecycles {
    bootstrap: LifecycleFn,
    mount: LifecycleFn,
    unmount: LifecycleFn,
}

/// Run the load phase for one application.
///
/// Blocks on the framework gate first: registration before startup is
/// legal, load-phase work before startup is not. Runs once per load,
/// triggered by the router's loader closure.
pub(crate) async fn load_app(
    ctx: Arc<Context>,
    app: Arc<AppDescriptor>,
    caller_hooks: Arc<LifecycleHooks>,
) -> Result<AppHandle, OrchestratorError> {
    ctx.start_gate.opened().await?;
    let config = ctx.config.get().ok_or(OrchestratorError::NotStarted)?;

    debug!(app = %app.name, entry = %app.entry, "loading application");

    let options = config.loader.for_app(&app.name);
    let loaded = ctx
        .entry_loader
        .load(&app.entry, &options)
        .await
        .map_err(|source| OrchestratorError::Entry { app: app.name.clone(), source })?;

    render(&app, &loaded.content, true).await?;

    // Evaluated once per pass; the cached value also decides the gate this
    // application creates at mount time and settles at unmount time.
    let singular = config.singular.evaluate(&app);

    let sandbox: Arc<dyn Sandbox> = match config.sandbox {
        // With isolation off every application shares the one ambient scope.
        SandboxMode::Disabled => {
            Arc::new(PassthroughSandbox::over(Arc::clone(&ctx.ambient_scope)))
        },
        SandboxMode::Proxy | SandboxMode::Snapshot => {
            ctx.sandboxes.create(&app.name, singular)
        },
    };

    let hooks = LifecycleHooks::compose(&sandbox.addon_hooks(), &caller_hooks);
    hooks.run(Stage::BeforeLoad, &app).await?;

    let scope = sandbox.scope();
    let bundle = loaded
        .scripts
        .execute(scope.as_ref(), !singular)
        .await
        .map_err(|source| OrchestratorError::Execute { app: app.name.clone(), source })?;

    let lifecycles = resolve_lifecycles(&app, &bundle, scope.as_ref())?;

    Ok(AppHandle {
        ctx,
        app,
        hooks,
        sandbox,
        lifecycles,
        content: loaded.content,
        singular,
        swap_gate: Mutex::new(None),
    })
}

/// Resolve the three lifecycle callables.
///
/// First consults the direct script execution result, then falls back to a
/// same-named export on the isolation scope. The fallback is deliberate and
/// logged; if any of the three remains missing the load fails fatally and
/// the application is never mounted.
fn resolve_lifecycles(
    app: &AppDescriptor,
    bundle: &LifecycleBundle,
    scope: &dyn ScopeHandle,
) -> Result<ResolvedLifecycles, OrchestratorError> {
    let mut resolved: [Option<LifecycleFn>; 3] = [None, None, None];
    let mut missing = Vec::new();

    for (slot, phase) in resolved.iter_mut().zip(LifecyclePhase::ALL) {
        *slot = bundle.phase(phase).or_else(|| {
            debug!(app = %app.name, phase = %phase, "no direct export, consulting sandbox scope");
            scope.exported(phase)
        });
        if slot.is_none() {
            missing.push(phase);
        }
    }

    match resolved {
        [Some(bootstrap), Some(mount), Some(unmount)] => {
            Ok(ResolvedLifecycles { bootstrap, mount, unmount })
        },
        _ => Err(OrchestratorError::MissingLifecycles { app: app.name.clone(), missing }),
    }
}

async fn render(
    app: &AppDescriptor,
    content: &str,
    loading: bool,
) -> Result<(), OrchestratorError> {
    app.render
        .render(RenderFrame { content, loading })
        .await
        .map_err(|source| OrchestratorError::Render { app: app.name.clone(), source })
}

/// A loaded application, ready for the router to drive.
///
/// Produced by the loader closure installed at registration; one handle per
/// load. The handle owns the swap gate it creates during mount and settles
/// during unmount.
pub struct AppHandle {
    ctx: Arc<Context>,
    app: Arc<AppDescriptor>,
    hooks: LifecycleHooks,
    sandbox: Arc<dyn Sandbox>,
    lifecycles: ResolvedLifecycles,
    content: String,
    singular: bool,
    swap_gate: Mutex<Option<Gate>>,
}

impl AppHandle {
    /// The application's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.app.name
    }

    /// The loaded, transformed entry content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether singular mode applies to this application, as evaluated
    /// once during its load pass.
    #[must_use]
    pub fn singular(&self) -> bool {
        self.singular
    }

    /// Run the application's own `bootstrap`.
    ///
    /// # Errors
    ///
    /// Propagates the lifecycle's rejection.
    pub async fn bootstrap(&self) -> Result<(), OrchestratorError> {
        self.invoke(LifecyclePhase::Bootstrap, &self.lifecycles.bootstrap).await
    }

    /// Run the mount sequence, each step awaited before the next.
    ///
    /// With singular mode in effect the first step parks on the gate
    /// guarding the currently displayed application's eventual unmount, so
    /// at most one application is in its displayed window at a time. The
    /// final step installs a fresh gate for whichever application mounts
    /// next.
    ///
    /// # Errors
    ///
    /// The first failing step aborts the remainder of the sequence.
    pub async fn mount(&self) -> Result<(), OrchestratorError> {
        // (1) await the predecessor's unmount gate
        if self.singular {
            let predecessor = self.ctx.swap_gate.lock().clone();
            if let Some(gate) = predecessor {
                gate.opened().await?;
            }
        }

        // (2) render with the loading indicator set
        render(&self.app, &self.content, true).await?;

        // (3) before_mount chain
        self.hooks.run(Stage::BeforeMount, &self.app).await?;

        // (4) activate isolation
        self.sandbox.activate().await.map_err(|source| OrchestratorError::Sandbox {
            app: self.app.name.clone(),
            op: "activate",
            source,
        })?;

        // (5) the application's own mount
        self.invoke(LifecyclePhase::Mount, &self.lifecycles.mount).await?;

        // (6) render with the loading indicator cleared
        render(&self.app, &self.content, false).await?;

        // (7) after_mount chain
        self.hooks.run(Stage::AfterMount, &self.app).await?;

        // (8) install the gate the next application will wait behind
        if self.singular {
            let gate = Gate::new();
            *self.ctx.swap_gate.lock() = Some(gate.clone());
            *self.swap_gate.lock() = Some(gate);
        }

        Ok(())
    }

    /// Run the unmount sequence, each step awaited before the next.
    ///
    /// On completion, settles the gate this application created during its
    /// own mount, releasing whichever application is waiting behind it.
    ///
    /// # Errors
    ///
    /// The first failing step aborts the remainder of the sequence; an
    /// aborted sequence leaves the swap gate unsettled.
    pub async fn unmount(&self) -> Result<(), OrchestratorError> {
        // (1) before_unmount chain
        self.hooks.run(Stage::BeforeUnmount, &self.app).await?;

        // (2) the application's own unmount
        self.invoke(LifecyclePhase::Unmount, &self.lifecycles.unmount).await?;

        // (3) deactivate isolation
        self.sandbox.deactivate().await.map_err(|source| OrchestratorError::Sandbox {
            app: self.app.name.clone(),
            op: "deactivate",
            source,
        })?;

        // (4) after_unmount chain
        self.hooks.run(Stage::AfterUnmount, &self.app).await?;

        // (5) clear the stage
        render(&self.app, "", false).await?;

        // (6) release the next application
        if self.singular {
            if let Some(gate) = self.swap_gate.lock().take() {
                gate.open();
            }
        }

        Ok(())
    }

    async fn invoke(
        &self,
        phase: LifecyclePhase,
        lifecycle: &LifecycleFn,
    ) -> Result<(), OrchestratorError> {
        lifecycle(Arc::clone(&self.app)).await.map_err(|source| OrchestratorError::Lifecycle {
            app: self.app.name.clone(),
            phase,
            source,
        })
    }
}

impl std::fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppHandle")
            .field("app", &self.app.name)
            .field("singular", &self.singular)
            .finish_non_exhaustive()
    }
}
