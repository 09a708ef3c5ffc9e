//! Process-wide framework configuration.
//!
//! Set once by [`Orchestrator::start`](crate::Orchestrator::start) and
//! read-only afterward. No teardown is modeled; the configuration lives for
//! the process.

use std::{fmt, sync::Arc};

use crate::{app::AppDescriptor, sandbox::SandboxCapability};

/// Caller-supplied transform applied to entry content before display.
pub type TemplateTransform = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Whether at most one application may be displayed at a time.
#[derive(Clone, Default)]
pub enum SingularRule {
    /// Every application is exclusive (the default).
    #[default]
    Always,
    /// Applications may share the stage freely.
    Never,
    /// Decided per application.
    Per(Arc<dyn Fn(&AppDescriptor) -> bool + Send + Sync>),
}

impl SingularRule {
    /// Evaluate the rule for one application.
    ///
    /// The sequencer evaluates this exactly once per lifecycle pass and
    /// reuses the cached value for the gate it creates and later settles,
    /// so a time-varying predicate cannot leave a gate unsettled.
    #[must_use]
    pub fn evaluate(&self, app: &AppDescriptor) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Per(predicate) => predicate(app),
        }
    }
}

impl fmt::Debug for SingularRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Never => f.write_str("Never"),
            Self::Per(_) => f.write_str("Per(..)"),
        }
    }
}

/// Which applications the prefetch collaborator is handed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Prefetch {
    /// Prefetch every registered application (the default).
    #[default]
    Enabled,
    /// Skip prefetching entirely.
    Disabled,
    /// Prefetch only the named applications.
    Only(Vec<String>),
}

impl Prefetch {
    /// Select the registered applications covered by this policy, in
    /// registration order.
    #[must_use]
    pub fn select(&self, apps: &[Arc<AppDescriptor>]) -> Vec<Arc<AppDescriptor>> {
        match self {
            Self::Enabled => apps.to_vec(),
            Self::Disabled => Vec::new(),
            Self::Only(names) => {
                apps.iter().filter(|app| names.contains(&app.name)).cloned().collect()
            },
        }
    }
}

/// The effective isolation policy after the startup capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxMode {
    /// Isolation off; applications share the ambient scope.
    Disabled,
    /// Full proxy isolation.
    Proxy,
    /// Constrained snapshot isolation (forces singular mode).
    Snapshot,
}

impl SandboxMode {
    /// Derive the effective mode from the request and the host capability.
    #[must_use]
    pub fn effective(requested: bool, capability: SandboxCapability) -> Self {
        if !requested {
            return Self::Disabled;
        }
        match capability {
            SandboxCapability::Proxy => Self::Proxy,
            SandboxCapability::Snapshot => Self::Snapshot,
        }
    }
}

/// Options passed opaque to the external entry loader.
#[derive(Clone, Default)]
pub struct LoaderOptions {
    /// Transform applied to raw entry content. The orchestrator composes
    /// its own per-application container wrapper around this.
    pub template_transform: Option<TemplateTransform>,
    /// Arbitrary pass-through options the loader may interpret.
    pub extra: serde_json::Value,
}

impl LoaderOptions {
    /// Apply the transform to raw content; identity when none is set.
    #[must_use]
    pub fn apply(&self, raw: String) -> String {
        match &self.template_transform {
            Some(transform) => transform(raw),
            None => raw,
        }
    }

    /// The effective options for one application: the caller transform (if
    /// any) runs first, then the content is wrapped in the application's
    /// container element so hosts can locate its subtree.
    #[must_use]
    pub fn for_app(&self, app_name: &str) -> Self {
        let caller = self.template_transform.clone();
        let name = app_name.to_owned();
        let composed: TemplateTransform = Arc::new(move |raw| {
            let inner = match &caller {
                Some(transform) => transform(raw),
                None => raw,
            };
            format!("<div data-stagehand-app=\"{name}\">{inner}</div>")
        });
        Self { template_transform: Some(composed), extra: self.extra.clone() }
    }
}

impl fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("template_transform", &self.template_transform.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

/// Options accepted by [`Orchestrator::start`](crate::Orchestrator::start).
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Prefetch policy for not-yet-active applications.
    pub prefetch: Prefetch,
    /// Whether to isolate applications (subject to the capability check).
    pub sandbox: bool,
    /// Singular-mode rule.
    pub singular: SingularRule,
    /// Pass-through entry loader options.
    pub loader: LoaderOptions,
}

impl StartOptions {
    /// The defaults: prefetch everything, sandbox on, singular on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefetch: Prefetch::Enabled,
            sandbox: true,
            singular: SingularRule::Always,
            loader: LoaderOptions::default(),
        }
    }
}

impl Default for StartOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The frozen process-wide configuration.
#[derive(Debug, Clone)]
pub struct FrameworkConfig {
    /// Effective singular rule (possibly forced by the capability check).
    pub singular: SingularRule,
    /// Effective isolation mode.
    pub sandbox: SandboxMode,
    /// Entry loader options as supplied at startup.
    pub loader: LoaderOptions,
}
