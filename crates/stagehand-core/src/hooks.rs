//! Lifecycle hook chains.
//!
//! Hooks are contributed by two independent sources: the isolation adapter
//! (add-on hooks) and the caller registering applications. Per stage they
//! are concatenated into one ordered chain, add-on hooks strictly before
//! caller hooks, and consumed once per stage per lifecycle pass.
//!
//! Chains run strictly sequentially: each hook's future is awaited before
//! the next hook begins, and a rejection aborts the remainder of the chain.

use std::{fmt, sync::Arc};

use futures::future::BoxFuture;

use crate::{
    app::AppDescriptor,
    error::{BoxError, OrchestratorError},
};

/// A single lifecycle hook.
///
/// Receives the descriptor of the application the stage is running for and
/// resolves when the hook's work is done.
pub type HookFn =
    Arc<dyn Fn(Arc<AppDescriptor>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// The five lifecycle stages hooks can attach to.
///
/// `BeforeLoad` runs once during loading, before the application's scripts
/// execute; the other four run at fixed points of the mount and unmount
/// sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Before the application's scripts execute.
    BeforeLoad,
    /// Mount sequence, before the application's own `mount`.
    BeforeMount,
    /// Mount sequence, after the application's own `mount`.
    AfterMount,
    /// Unmount sequence, before the application's own `unmount`.
    BeforeUnmount,
    /// Unmount sequence, after the application's own `unmount`.
    AfterUnmount,
}

impl Stage {
    /// All stages, in lifecycle order.
    pub const ALL: [Self; 5] =
        [Self::BeforeLoad, Self::BeforeMount, Self::AfterMount, Self::BeforeUnmount, Self::AfterUnmount];

    /// Stable stage name, as used in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BeforeLoad => "before_load",
            Self::BeforeMount => "before_mount",
            Self::AfterMount => "after_mount",
            Self::BeforeUnmount => "before_unmount",
            Self::AfterUnmount => "after_unmount",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::BeforeLoad => 0,
            Self::BeforeMount => 1,
            Self::AfterMount => 2,
            Self::BeforeUnmount => 3,
            Self::AfterUnmount => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered hook chain per lifecycle stage.
///
/// A fixed-size table keyed by [`Stage`]; absent contributions are simply
/// empty chains. The table never reorders hooks within one source.
#[derive(Default, Clone)]
pub struct LifecycleHooks {
    stages: [Vec<HookFn>; 5],
}

impl LifecycleHooks {
    /// An empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook to the given stage's chain.
    #[must_use]
    pub fn on(mut self, stage: Stage, hook: HookFn) -> Self {
        self.stages[stage.index()].push(hook);
        self
    }

    /// The chain registered for `stage`, in execution order.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> &[HookFn] {
        &self.stages[stage.index()]
    }

    /// Whether no stage has any hook.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.iter().all(Vec::is_empty)
    }

    /// Merge two hook sets into one chain per stage.
    ///
    /// For every stage the add-on hooks run first, in their given order,
    /// followed by the caller hooks in their given order.
    #[must_use]
    pub fn compose(addon: &Self, caller: &Self) -> Self {
        let mut composed = Self::default();
        for stage in Stage::ALL {
            let chain = &mut composed.stages[stage.index()];
            chain.extend(addon.stage(stage).iter().cloned());
            chain.extend(caller.stage(stage).iter().cloned());
        }
        composed
    }

    /// Run one stage's chain for `app`, strictly sequentially.
    ///
    /// An empty chain completes immediately. Each hook is awaited before
    /// the next begins; hooks never run concurrently within one stage.
    ///
    /// # Errors
    ///
    /// The first rejecting hook aborts the remainder of the chain; its
    /// failure is wrapped with stage and application context.
    pub async fn run(
        &self,
        stage: Stage,
        app: &Arc<AppDescriptor>,
    ) -> Result<(), OrchestratorError> {
        for hook in self.stage(stage) {
            hook(Arc::clone(app)).await.map_err(|source| OrchestratorError::Hook {
                stage,
                app: app.name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("LifecycleHooks");
        for stage in Stage::ALL {
            dbg.field(stage.name(), &self.stage(stage).len());
        }
        dbg.finish()
    }
}
