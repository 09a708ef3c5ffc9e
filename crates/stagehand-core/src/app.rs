//! Application descriptors and the per-application render contract.

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::error::BoxError;

/// Decides whether an application should be active for a given location.
///
/// The router evaluates this against its current location; the orchestrator
/// only carries it from registration to the router.
#[derive(Clone)]
pub enum ActiveRule {
    /// Active when the location starts with this prefix.
    Prefix(String),
    /// Arbitrary predicate over the location.
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl ActiveRule {
    /// Evaluate the rule against a location.
    #[must_use]
    pub fn matches(&self, location: &str) -> bool {
        match self {
            Self::Prefix(prefix) => location.starts_with(prefix.as_str()),
            Self::Predicate(predicate) => predicate(location),
        }
    }
}

impl fmt::Debug for ActiveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// One frame handed to the per-application renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFrame<'a> {
    /// Content to display; empty after unmount clears the stage.
    pub content: &'a str,
    /// Whether the application is still loading or mounting.
    pub loading: bool,
}

/// Per-application render callback.
///
/// Supplied by the host for each registered application; the sequencer
/// invokes it with the loading flag set while loading and mounting, cleared
/// once mounted, and with empty content after unmount.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Display the frame.
    async fn render(&self, frame: RenderFrame<'_>) -> Result<(), BoxError>;
}

/// An independently built sub-application registered with the host.
///
/// Immutable once registered; the registry keys applications by `name` and
/// silently drops re-registrations of an existing name.
#[derive(Clone)]
pub struct AppDescriptor {
    /// Unique application name.
    pub name: String,
    /// Entry locator handed to the external entry loader.
    pub entry: String,
    /// Render callback for this application's content.
    pub render: Arc<dyn Renderer>,
    /// Activity rule evaluated by the router.
    pub active_rule: ActiveRule,
    /// Arbitrary props passed through to the application's lifecycles.
    pub props: serde_json::Value,
}

impl AppDescriptor {
    /// Create a descriptor with empty props.
    pub fn new(
        name: impl Into<String>,
        entry: impl Into<String>,
        render: Arc<dyn Renderer>,
        active_rule: ActiveRule,
    ) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            render,
            active_rule,
            props: serde_json::Value::Null,
        }
    }

    /// Attach props to the descriptor.
    #[must_use]
    pub fn with_props(mut self, props: serde_json::Value) -> Self {
        self.props = props;
        self
    }

    #[cfg(test)]
    pub(crate) fn for_tests(name: &str) -> Self {
        struct NullRenderer;

        #[async_trait]
        impl Renderer for NullRenderer {
            async fn render(&self, _frame: RenderFrame<'_>) -> Result<(), BoxError> {
                Ok(())
            }
        }

        Self::new(name, format!("//apps/{name}"), Arc::new(NullRenderer), ActiveRule::Prefix(format!("/{name}")))
    }
}

impl fmt::Debug for AppDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDescriptor")
            .field("name", &self.name)
            .field("entry", &self.entry)
            .field("active_rule", &self.active_rule)
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_rule_matches_locations() {
        let rule = ActiveRule::Prefix("/orders".to_owned());
        assert!(rule.matches("/orders"));
        assert!(rule.matches("/orders/42"));
        assert!(!rule.matches("/billing"));
    }

    #[test]
    fn predicate_rule_delegates() {
        let rule = ActiveRule::Predicate(Arc::new(|location| location.contains("beta")));
        assert!(rule.matches("/apps/beta/home"));
        assert!(!rule.matches("/apps/stable/home"));
    }
}
