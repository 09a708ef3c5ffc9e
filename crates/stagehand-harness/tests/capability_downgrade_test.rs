//! Isolation capability shortfall handling.
//!
//! When the host lacks the proxy primitive, startup must complete anyway:
//! isolation downgrades to the snapshot variant and singular mode is forced
//! on, since snapshot isolation cannot support concurrent display.
//! Subsequent mounts still execute fully.

use stagehand_core::{
    config::{SingularRule, StartOptions},
    entry::LifecyclePhase,
    hooks::LifecycleHooks,
    sandbox::SandboxCapability,
};
use stagehand_harness::{SimEntry, SimHost};

#[tokio::test]
async fn snapshot_capability_forces_singular_mode() {
    let host = SimHost::with_capability(SandboxCapability::Snapshot);
    host.orchestrator.register([host.app("alpha"), host.app("beta")], LifecycleHooks::new());

    // The caller asked for free interleaving; the downgrade overrides it.
    host.orchestrator
        .start(StartOptions { singular: SingularRule::Never, ..StartOptions::new() });
    assert!(host.orchestrator.is_active());

    let alpha = host.load("alpha").await.expect("alpha loads");
    assert!(alpha.singular(), "downgraded isolation must force exclusive display");

    // The full mount sequence still executes under the downgraded variant.
    alpha.bootstrap().await.expect("bootstrap runs");
    alpha.mount().await.expect("mount runs");
    host.log.assert_order("sandbox:activate:alpha", "mount:alpha");
    host.log.assert_order("mount:alpha", "render:alpha:done");

    // Exclusive sandboxes are created, since every app is now singular.
    assert!(host.log.contains("sandbox:create:alpha:exclusive=true"));

    alpha.unmount().await.expect("unmount runs");
    host.log.assert_order("unmount:alpha", "render:alpha:cleared");
}

#[tokio::test]
async fn disabled_sandbox_uses_passthrough_scope() {
    let host = SimHost::new();
    host.orchestrator.register([host.app("orders")], LifecycleHooks::new());
    host.orchestrator.start(StartOptions { sandbox: false, ..StartOptions::new() });

    let handle = host.load("orders").await.expect("load succeeds");
    handle.mount().await.expect("mount runs");
    handle.unmount().await.expect("unmount runs");

    // No adapter was created or driven; lifecycles still ran.
    assert!(!host.log.events().iter().any(|e| e.starts_with("sandbox:")));
    assert!(host.log.contains("mount:orders"));
    assert!(host.log.contains("unmount:orders"));
}

#[tokio::test]
async fn disabled_sandbox_shares_one_ambient_scope() {
    let host = SimHost::new();
    // Alpha exports all three lifecycles onto the ambient scope; beta's
    // scripts export nothing at all.
    host.script(
        "alpha",
        SimEntry { via_scope: LifecyclePhase::ALL.to_vec(), ..SimEntry::default() },
    );
    host.script("beta", SimEntry::default());

    host.orchestrator.register([host.app("alpha"), host.app("beta")], LifecycleHooks::new());
    host.orchestrator.start(StartOptions {
        sandbox: false,
        singular: SingularRule::Never,
        ..StartOptions::new()
    });

    host.load("alpha").await.expect("alpha loads");

    // Beta's fallback lookup resolves against the exports alpha left on
    // the shared ambient scope.
    let beta = host.load("beta").await.expect("ambient exports resolve beta's lifecycles");
    beta.bootstrap().await.expect("bootstrap runs");
    beta.mount().await.expect("mount runs");
    assert!(host.log.contains("bootstrap:beta"));
    assert!(host.log.contains("mount:beta"));
}

#[tokio::test]
async fn proxy_capability_keeps_requested_rule() {
    let host = SimHost::new();
    host.orchestrator.register([host.app("orders")], LifecycleHooks::new());
    host.orchestrator
        .start(StartOptions { singular: SingularRule::Never, ..StartOptions::new() });

    let handle = host.load("orders").await.expect("load succeeds");
    assert!(!handle.singular());
    assert!(host.log.contains("sandbox:create:orders:exclusive=false"));
}
