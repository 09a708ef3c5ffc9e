//! Registry and startup behavior.
//!
//! Covers duplicate-name registration, the framework-gate barrier between
//! registration and load-phase work, startup idempotence, and the prefetch
//! trigger.

use stagehand_core::{
    config::{Prefetch, StartOptions},
    hooks::LifecycleHooks,
};
use stagehand_harness::SimHost;

#[tokio::test]
async fn duplicate_names_register_once() {
    let host = SimHost::new();

    host.orchestrator.register([host.app("orders"), host.app("billing")], LifecycleHooks::new());
    // Same name again, different entry; silently dropped.
    let mut dup = host.app("orders");
    dup.entry = "//sim/orders-v2".to_owned();
    host.orchestrator.register([dup], LifecycleHooks::new());

    let names: Vec<_> =
        host.orchestrator.registered().iter().map(|app| app.name.clone()).collect();
    assert_eq!(names, vec!["orders", "billing"]);

    // The router saw exactly one registration per name; the duplicate had
    // no observable effect there either.
    assert_eq!(host.router.names(), vec!["orders", "billing"]);
    assert_eq!(host.orchestrator.registered()[0].entry, SimHost::entry("orders"));
}

#[tokio::test]
async fn load_phase_blocks_until_start() {
    let host = SimHost::new();
    host.orchestrator.register([host.app("orders")], LifecycleHooks::new());

    // Drive the loader the router holds, before start() has run.
    let loader = host.router.loader("orders").expect("registered");
    let pending = tokio::spawn(async move { loader().await });
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    // No load-phase work yet: no entry load, no render, no execution.
    // (Registration itself recorded its router wiring, nothing more.)
    let load_phase: Vec<_> = host
        .log
        .events()
        .into_iter()
        .filter(|e| !e.starts_with("router:register:"))
        .collect();
    assert!(load_phase.is_empty(), "unexpected load-phase work: {load_phase:?}");
    assert!(!host.router.is_started());
    assert!(!host.orchestrator.is_active());

    host.orchestrator.start(StartOptions::new());
    let handle = pending.await.expect("join").expect("load succeeds");

    assert!(host.orchestrator.is_active());
    assert_eq!(handle.name(), "orders");
    // The router started before the gate opened any loader.
    host.log.assert_order("router:start", &format!("load:{}", SimHost::entry("orders")));
}

#[tokio::test]
async fn start_is_forward_only() {
    let host = SimHost::new();
    host.orchestrator.register([host.app("orders")], LifecycleHooks::new());

    host.orchestrator.start(StartOptions::new());
    host.orchestrator.start(StartOptions { prefetch: Prefetch::Disabled, ..StartOptions::new() });

    // The second call was a no-op: the router started once, prefetch
    // triggered once.
    let starts = host.log.events().iter().filter(|e| *e == "router:start").count();
    assert_eq!(starts, 1);
    let prefetches =
        host.log.events().iter().filter(|e| e.starts_with("prefetch:")).count();
    assert_eq!(prefetches, 1);
}

#[tokio::test]
async fn prefetch_policy_selects_apps() {
    let host = SimHost::new();
    host.orchestrator.register(
        [host.app("orders"), host.app("billing"), host.app("support")],
        LifecycleHooks::new(),
    );

    host.orchestrator.start(StartOptions {
        prefetch: Prefetch::Only(vec!["support".into(), "orders".into()]),
        ..StartOptions::new()
    });

    // Registration order is preserved in the selection.
    assert_eq!(host.prefetcher.seen(), vec!["orders", "support"]);
}

#[tokio::test]
async fn disabled_prefetch_never_triggers() {
    let host = SimHost::new();
    host.orchestrator.register([host.app("orders")], LifecycleHooks::new());

    host.orchestrator.start(StartOptions { prefetch: Prefetch::Disabled, ..StartOptions::new() });

    assert!(host.prefetcher.seen().is_empty());
    assert!(!host.log.events().iter().any(|e| e.starts_with("prefetch:")));
}

#[tokio::test]
async fn loaded_content_is_wrapped_in_app_container() {
    let host = SimHost::new();
    host.orchestrator.register([host.app("orders")], LifecycleHooks::new());
    host.orchestrator.start(StartOptions::new());

    let handle = host.load("orders").await.expect("load succeeds");
    assert_eq!(
        handle.content(),
        "<div data-stagehand-app=\"orders\"><main data-entry=\"//sim/orders\"></main></div>"
    );
}
