//! Lifecycle export resolution and load-phase failure handling.
//!
//! An application may export its three lifecycle functions directly from
//! script execution or as same-named exports on its isolation scope; the
//! scope lookup is the documented fallback. If any of the three is still
//! missing the load rejects and the application is never driven.

use stagehand_core::{
    config::StartOptions,
    entry::LifecyclePhase,
    error::OrchestratorError,
    hooks::{LifecycleHooks, Stage},
};
use stagehand_harness::{SimEntry, SimHost, log_hook};

#[tokio::test]
async fn scope_exports_back_fill_missing_lifecycles() {
    let host = SimHost::new();
    host.script(
        "orders",
        SimEntry {
            direct: vec![LifecyclePhase::Bootstrap, LifecyclePhase::Unmount],
            via_scope: vec![LifecyclePhase::Mount],
            hold_mount: None,
        },
    );
    host.orchestrator.register([host.app("orders")], LifecycleHooks::new());
    host.orchestrator.start(StartOptions::new());

    let handle = host.load("orders").await.expect("scope fallback resolves mount");
    handle.bootstrap().await.expect("bootstrap runs");
    handle.mount().await.expect("mount runs via scope export");
    handle.unmount().await.expect("unmount runs");

    host.log.assert_order("bootstrap:orders", "mount:orders");
    host.log.assert_order("mount:orders", "unmount:orders");
}

#[tokio::test]
async fn all_lifecycles_via_scope_resolve() {
    let host = SimHost::new();
    host.script(
        "orders",
        SimEntry { via_scope: LifecyclePhase::ALL.to_vec(), ..SimEntry::default() },
    );
    host.orchestrator.register([host.app("orders")], LifecycleHooks::new());
    host.orchestrator.start(StartOptions::new());

    let handle = host.load("orders").await.expect("all-scope entry resolves");
    handle.mount().await.expect("mount runs");
}

#[tokio::test]
async fn missing_lifecycle_rejects_load() {
    let host = SimHost::new();
    // No mount anywhere: not in the execution result, not on the scope.
    host.script(
        "broken",
        SimEntry {
            direct: vec![LifecyclePhase::Bootstrap, LifecyclePhase::Unmount],
            ..SimEntry::default()
        },
    );
    host.orchestrator.register([host.app("broken")], LifecycleHooks::new());
    host.orchestrator.start(StartOptions::new());

    let err = host.load("broken").await.expect_err("load must reject");
    match err {
        OrchestratorError::MissingLifecycles { app, missing } => {
            assert_eq!(app, "broken");
            assert_eq!(missing, vec![LifecyclePhase::Mount]);
        },
        other => panic!("unexpected error: {other}"),
    }

    // The application's lifecycles were never invoked.
    assert!(!host.log.contains("bootstrap:broken"));
    assert!(!host.log.contains("mount:broken"));
    assert!(!host.log.contains("unmount:broken"));
}

#[tokio::test]
async fn entirely_empty_entry_reports_all_three() {
    let host = SimHost::new();
    host.script("hollow", SimEntry::default());
    host.orchestrator.register([host.app("hollow")], LifecycleHooks::new());
    host.orchestrator.start(StartOptions::new());

    let err = host.load("hollow").await.expect_err("load must reject");
    match err {
        OrchestratorError::MissingLifecycles { missing, .. } => {
            assert_eq!(missing, LifecyclePhase::ALL.to_vec());
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failing_hook_aborts_mount_sequence() {
    let host = SimHost::new();
    let hooks = LifecycleHooks::new()
        .on(Stage::BeforeMount, {
            std::sync::Arc::new(|_app| {
                Box::pin(async { Err("feature flag service down".into()) })
            })
        })
        .on(Stage::AfterMount, log_hook(&host.log, "hook:after_mount"));

    host.orchestrator.register([host.app("orders")], hooks);
    host.orchestrator.start(StartOptions::new());

    let handle = host.load("orders").await.expect("load succeeds");
    let err = handle.mount().await.expect_err("mount must abort");
    assert!(matches!(err, OrchestratorError::Hook { stage: Stage::BeforeMount, .. }));

    // Steps after the failing hook never ran.
    assert!(!host.log.contains("sandbox:activate:orders"));
    assert!(!host.log.contains("mount:orders"));
    assert!(!host.log.contains("hook:after_mount:orders"));
}
