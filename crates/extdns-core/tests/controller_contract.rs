//! Architectural Contract Test: Controller Loop
//!
//! This test verifies how the controller drives source, plan and registry.
//!
//! Constraints verified:
//! - A single run applies exactly one change-set through the registry
//! - Dry-run never reaches the registry's write path
//! - Cleanup deletes everything, even under the upsert-only policy
//! - A failed tick is reported and the loop keeps running
//! - Interval mode terminates on the shutdown signal
//!
//! If this test fails, someone has added:
//! - Hidden retries
//! - Writes that bypass dry-run
//! - A shutdown path that can hang

mod common;

use common::*;
use extdns_core::{Controller, ControllerEvent, Error, PolicyKind, RunMode};
use std::time::Duration;

#[tokio::test]
async fn once_applies_planned_changes() {
    let source = MockSource::new(vec![
        a("keep.example.org", "1.1.1.1"),
        a("new.example.org", "2.2.2.2"),
        a("moved.example.org", "3.3.3.4"),
    ]);
    let registry = MockRegistry::new(vec![
        a("keep.example.org", "1.1.1.1"),
        a("moved.example.org", "3.3.3.3"),
        a("stale.example.org", "4.4.4.4"),
    ]);
    let config = controller_config(RunMode::Once, PolicyKind::Sync, false);

    let (controller, mut events) =
        Controller::new(Box::new(source), Box::new(registry.clone()), &config)
            .expect("controller construction succeeds");

    controller.run().await.expect("single run succeeds");

    let applied = registry.applied();
    assert_eq!(applied.len(), 1, "exactly one change-set is applied");
    assert_eq!(names(&applied[0].create), vec!["new.example.org"]);
    assert_eq!(names(&applied[0].update_new), vec!["moved.example.org"]);
    assert_eq!(names(&applied[0].delete), vec!["stale.example.org"]);

    let events = drain(&mut events);
    assert_eq!(events.first(), Some(&ControllerEvent::Started { mode: RunMode::Once }));
    assert!(events.contains(&ControllerEvent::PlanCalculated {
        create: 1,
        update: 1,
        delete: 1,
    }));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ControllerEvent::ChangesApplied { create: 1, update: 1, delete: 1, .. }))
    );
    assert!(matches!(events.last(), Some(ControllerEvent::Stopped { .. })));
}

#[tokio::test]
async fn second_run_is_up_to_date() {
    let source = MockSource::new(vec![a("foo.example.org", "1.2.3.4")]);
    let registry = MockRegistry::new(Vec::new());
    let config = controller_config(RunMode::Once, PolicyKind::Sync, false);

    let (controller, mut events) =
        Controller::new(Box::new(source), Box::new(registry.clone()), &config).unwrap();

    controller.run_once().await.unwrap();
    let result = controller.run_once().await.unwrap();

    assert!(result.changes.is_empty());
    assert_eq!(registry.applied().len(), 1);
    assert!(drain(&mut events).contains(&ControllerEvent::UpToDate));
}

#[tokio::test]
async fn dry_run_never_writes() {
    let source = MockSource::new(vec![a("new.example.org", "2.2.2.2")]);
    let registry = MockRegistry::new(vec![a("stale.example.org", "4.4.4.4")]);
    let config = controller_config(RunMode::Once, PolicyKind::Sync, true);

    let (controller, mut events) =
        Controller::new(Box::new(source), Box::new(registry.clone()), &config).unwrap();

    let result = controller.run_once().await.unwrap();

    assert_eq!(result.changes.create.len(), 1);
    assert_eq!(result.changes.delete.len(), 1);
    assert!(registry.applied().is_empty(), "dry-run must not apply changes");
    assert_eq!(registry.current(), vec![a("stale.example.org", "4.4.4.4")]);
    assert!(drain(&mut events).contains(&ControllerEvent::DryRunSkipped {
        create: 1,
        update: 0,
        delete: 1,
    }));
}

#[tokio::test]
async fn upsert_only_keeps_stale_records() {
    let source = MockSource::new(vec![a("new.example.org", "2.2.2.2")]);
    let registry = MockRegistry::new(vec![a("stale.example.org", "4.4.4.4")]);
    let config = controller_config(RunMode::Once, PolicyKind::UpsertOnly, false);

    let (controller, _events) =
        Controller::new(Box::new(source), Box::new(registry.clone()), &config).unwrap();

    controller.run_once().await.unwrap();

    let applied = registry.applied();
    assert_eq!(names(&applied[0].create), vec!["new.example.org"]);
    assert!(applied[0].delete.is_empty());
}

#[tokio::test]
async fn cleanup_deletes_everything() {
    let source = MockSource::new(vec![a("foo.example.org", "1.1.1.1")]);
    let registry = MockRegistry::new(vec![
        a("foo.example.org", "1.1.1.1"),
        a("bar.example.org", "2.2.2.2"),
    ]);
    // The configured policy is ignored in cleanup mode
    let config = controller_config(RunMode::Cleanup, PolicyKind::UpsertOnly, false);

    let (controller, _events) = Controller::new(
        Box::new(MockSource::sharing_counters_with(&source)),
        Box::new(registry.clone()),
        &config,
    )
    .unwrap();

    controller.run().await.unwrap();

    assert_eq!(source.call_count(), 0, "cleanup does not consult the source");
    let applied = registry.applied();
    assert_eq!(applied.len(), 1);
    assert!(applied[0].create.is_empty());
    assert_eq!(names(&applied[0].delete), vec!["foo.example.org", "bar.example.org"]);
    assert!(registry.current().is_empty());
}

#[tokio::test]
async fn source_failure_is_reported() {
    let source = FailingSource {
        message: "no endpoints for you",
    };
    let registry = MockRegistry::new(Vec::new());
    let config = controller_config(RunMode::Once, PolicyKind::Sync, false);

    let (controller, mut events) =
        Controller::new(Box::new(source), Box::new(registry.clone()), &config).unwrap();

    let err = controller.run().await.unwrap_err();

    assert!(matches!(err, Error::Source(_)));
    assert!(registry.applied().is_empty());
    assert!(drain(&mut events).iter().any(
        |e| matches!(e, ControllerEvent::SyncFailed { error } if error.contains("no endpoints for you"))
    ));
}

#[tokio::test]
async fn interval_survives_failed_ticks() {
    let registry = MockRegistry::failing(Vec::new());
    let source = MockSource::new(vec![a("foo.example.org", "1.2.3.4")]);
    let config = controller_config(RunMode::Interval, PolicyKind::Sync, false);

    let (controller, mut events) =
        Controller::new(Box::new(source), Box::new(registry), &config).unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { controller.run_with_shutdown(Some(shutdown_rx)).await });

    // The first tick fires immediately
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("controller should terminate within 5 seconds")
        .unwrap();
    assert!(result.is_ok(), "failed ticks do not end the loop: {:?}", result);

    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(e, ControllerEvent::SyncFailed { .. })));
    assert!(matches!(events.last(), Some(ControllerEvent::Stopped { .. })));
}

#[tokio::test]
async fn dropped_shutdown_sender_stops_the_loop() {
    let config = controller_config(RunMode::Interval, PolicyKind::Sync, false);
    let (controller, _events) = Controller::new(
        Box::new(MockSource::new(Vec::new())),
        Box::new(MockRegistry::new(Vec::new())),
        &config,
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    drop(shutdown_tx);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        controller.run_with_shutdown(Some(shutdown_rx)),
    )
    .await;

    assert!(matches!(result, Ok(Ok(()))));
}

#[test]
fn invalid_controller_config_is_rejected() {
    let mut config = controller_config(RunMode::Interval, PolicyKind::Sync, false);
    config.controller.interval_secs = 0;

    let result = Controller::new(
        Box::new(MockSource::new(Vec::new())),
        Box::new(MockRegistry::new(Vec::new())),
        &config,
    );

    assert!(matches!(result, Err(Error::Config(_))));
}
