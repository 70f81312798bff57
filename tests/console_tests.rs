//! End-to-end dispatch tests through the console entry points

mod common;

use common::{Behavior, FakeRunner, FakeStatus, console, console_with_store};
use rosa_console::backend::TaskResponse;
use rosa_console::operations::OperationCatalog;
use rosa_console::status::AUTH_REQUIRED_REASON;
use rosa_console::storage::{KeyValueStore, MemoryStore};
use rosa_console::{Decision, DispatchOptions, DispatchOutcome, NotificationKind, Operation};
use std::sync::Arc;
use std::time::Duration;

fn catalog_op(id: &str) -> Operation {
    OperationCatalog::new().get(id).cloned().unwrap()
}

#[tokio::test]
async fn test_unauthenticated_dispatch_is_blocked() {
    let runner = FakeRunner::new(Behavior::Respond(TaskResponse::succeeded("ok")));
    let console = console(FakeStatus::unauthenticated(), runner.clone());
    console.refresh_status().await;

    let op = catalog_op("check-components");
    assert_eq!(
        console.evaluate_operation(&op),
        Decision::Block(AUTH_REQUIRED_REASON.to_string())
    );

    let outcome = console.run_operation(&op, DispatchOptions::default()).await;
    assert_eq!(
        outcome,
        DispatchOutcome::Blocked(AUTH_REQUIRED_REASON.to_string())
    );
    assert_eq!(runner.calls(), 0);

    let notifications = console.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Error);
    assert_eq!(notifications[0].message, AUTH_REQUIRED_REASON);
}

#[tokio::test]
async fn test_blocked_destructive_is_blocked_not_confirmed() {
    let runner = FakeRunner::new(Behavior::Respond(TaskResponse::succeeded("ok")));
    let console = console(FakeStatus::unauthenticated(), runner.clone());
    console.refresh_status().await;

    let outcome = console
        .run_operation(&catalog_op("delete-rosa-cluster"), DispatchOptions::confirmed())
        .await;
    assert_eq!(
        outcome,
        DispatchOutcome::Blocked(AUTH_REQUIRED_REASON.to_string())
    );
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_connection_failure_does_not_block() {
    let status = FakeStatus {
        connection_error: Some("oc: command not found".to_string()),
        ..FakeStatus::ready()
    };
    let runner = FakeRunner::new(Behavior::Respond(TaskResponse::succeeded(
        "All components are enabled",
    )));
    let console = console(status, runner.clone());
    console.refresh_status().await;

    assert!(!console.snapshots().connection.ok);
    assert!(console.readiness().ready);

    let outcome = console
        .run_operation(&catalog_op("check-components"), DispatchOptions::default())
        .await;
    assert!(outcome.result().is_some_and(|r| r.success));
    assert_eq!(runner.tasks(), vec!["tasks/get_mce_component_status.yml"]);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_after_sixty_seconds() {
    let runner = FakeRunner::new(Behavior::Hang);
    let console = console(FakeStatus::ready(), runner.clone());
    console.refresh_status().await;

    let op = catalog_op("create-rosa-cluster");
    let started = tokio::time::Instant::now();
    let outcome = console
        .run_operation(
            &op,
            DispatchOptions::default().with_timeout(Duration::from_millis(60_000)),
        )
        .await;

    assert_eq!(started.elapsed(), Duration::from_secs(60));
    let result = outcome.result().cloned().unwrap();
    assert!(!result.success);
    assert!(result.timed_out);
    assert!(!console.is_loading(&op.id));

    let notifications = console.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Error);
    assert!(notifications[0].message.contains("timed out"));
    assert_eq!(
        notifications[0].message,
        "Create ROSA HCP cluster timed out after 60s"
    );
}

#[tokio::test]
async fn test_embedded_failure_is_reported() {
    let runner = FakeRunner::new(Behavior::Respond(TaskResponse {
        success: false,
        output: Some("TASK [Create VPC] fatal".to_string()),
        error: Some("VpcLimitExceeded".to_string()),
        ..TaskResponse::default()
    }));
    let console = console(FakeStatus::ready(), runner);
    console.refresh_status().await;

    let outcome = console
        .run_operation(&catalog_op("provision-rosa-network"), DispatchOptions::default())
        .await;
    let result = outcome.result().cloned().unwrap();
    assert!(!result.success);
    assert!(!result.timed_out);
    assert_eq!(result.error.as_deref(), Some("VpcLimitExceeded"));

    let notifications = console.notifications();
    assert_eq!(
        notifications[0].message,
        "Failed to execute Provision ROSA network: VpcLimitExceeded"
    );
}

#[tokio::test]
async fn test_collaborator_error_is_reported() {
    let runner = FakeRunner::new(Behavior::Error("connection refused".to_string()));
    let console = console(FakeStatus::ready(), runner);
    console.refresh_status().await;

    let outcome = console
        .run_operation(&catalog_op("validate-mce"), DispatchOptions::default())
        .await;
    let result = outcome.result().cloned().unwrap();
    assert!(!result.success);
    assert!(!result.timed_out);
    assert_eq!(
        console.notifications()[0].message,
        "Failed to execute Validate MCE: connection refused"
    );
}

#[tokio::test]
async fn test_confirmation_flow() {
    let runner = FakeRunner::new(Behavior::Respond(TaskResponse::succeeded("deleted")));
    let console = console(FakeStatus::ready(), runner.clone());
    console.refresh_status().await;

    let op = catalog_op("remove-rosa-network");
    assert_eq!(console.evaluate_operation(&op), Decision::RequiresConfirmation);

    let outcome = console.run_operation(&op, DispatchOptions::default()).await;
    assert_eq!(outcome, DispatchOutcome::NeedsConfirmation);
    assert_eq!(runner.calls(), 0);

    let outcome = console.run_operation(&op, DispatchOptions::confirmed()).await;
    assert!(outcome.result().is_some_and(|r| r.success));
    assert_eq!(runner.calls(), 1);
    assert_eq!(
        console.notifications()[0].message,
        "Remove ROSA network completed successfully"
    );
}

#[tokio::test]
async fn test_history_entry_keeps_confirmation_gate() {
    let store = MemoryStore::new();
    let stored = serde_json::json!([{
        "operation": {
            "id": "delete-rosa-cluster",
            "title": "Delete ROSA HCP cluster",
            "task": {
                "task_file": "tasks/delete_rosa_hcp_cluster.yml",
                "description": "Delete ROSA HCP cluster"
            }
        },
        "timestamp": "2026-10-19T10:00:00Z"
    }]);
    store
        .set_raw("rosa-console:recentOperations", &stored.to_string())
        .unwrap();

    let runner = FakeRunner::new(Behavior::Respond(TaskResponse::succeeded("deleted")));
    let console = console_with_store(FakeStatus::ready(), runner.clone(), store);
    console.refresh_status().await;

    let op = console.preferences().recent_operations()[0].operation.clone();
    assert!(op.is_destructive());
    assert_eq!(console.evaluate_operation(&op), Decision::RequiresConfirmation);

    let outcome = console.run_operation(&op, DispatchOptions::default()).await;
    assert_eq!(outcome, DispatchOutcome::NeedsConfirmation);
    assert_eq!(runner.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_loading_is_per_operation() {
    let runner = FakeRunner::new(Behavior::RespondAfter(
        Duration::from_secs(5),
        TaskResponse::succeeded("done"),
    ));
    let console = Arc::new(console(FakeStatus::ready(), runner.clone()));
    console.refresh_status().await;

    let first = {
        let console = Arc::clone(&console);
        tokio::spawn(async move {
            console
                .run_operation(&catalog_op("validate-mce"), DispatchOptions::default())
                .await
        })
    };
    let second = {
        let console = Arc::clone(&console);
        tokio::spawn(async move {
            console
                .run_operation(&catalog_op("check-components"), DispatchOptions::default())
                .await
        })
    };

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(console.is_loading("validate-mce"));
    assert!(console.is_loading("check-components"));
    assert_eq!(
        console.loading_ids(),
        vec!["check-components".to_string(), "validate-mce".to_string()]
    );

    let duplicate = console
        .run_operation(&catalog_op("validate-mce"), DispatchOptions::default())
        .await;
    assert_eq!(duplicate, DispatchOutcome::AlreadyRunning);

    let first = first.await.unwrap();
    let second = second.await.unwrap();
    assert!(first.result().is_some_and(|r| r.success));
    assert!(second.result().is_some_and(|r| r.success));
    assert_eq!(runner.calls(), 2);
    assert!(console.loading_ids().is_empty());
}

#[tokio::test]
async fn test_history_recorded_on_dispatch() {
    let store = MemoryStore::new();
    let runner = FakeRunner::new(Behavior::Error("boom".to_string()));
    let console = console_with_store(FakeStatus::ready(), runner.clone(), store.clone());
    console.refresh_status().await;

    let catalog = OperationCatalog::new();
    let ids: Vec<&str> = catalog
        .all()
        .iter()
        .filter(|op| !op.is_destructive())
        .map(|op| op.id.as_str())
        .take(6)
        .collect();
    assert_eq!(ids.len(), 6);

    for id in &ids {
        console
            .run_operation(catalog.get(id).unwrap(), DispatchOptions::default())
            .await;
    }

    // Failed runs are still history: recording happens at dispatch
    let recent: Vec<String> = console
        .preferences()
        .recent_operations()
        .into_iter()
        .map(|r| r.operation.id)
        .collect();
    let expected: Vec<String> = ids.iter().rev().take(5).map(|id| id.to_string()).collect();
    assert_eq!(recent, expected);

    // A second console over the same store sees the persisted history
    let reopened = console_with_store(FakeStatus::ready(), runner, store);
    assert_eq!(reopened.preferences().recent_operations().len(), 5);
    assert_eq!(
        reopened.preferences().recent_operations()[0].operation.id,
        ids[5]
    );
}

#[tokio::test(start_paused = true)]
async fn test_status_polling_refreshes() {
    let runner = FakeRunner::new(Behavior::Respond(TaskResponse::succeeded("ok")));
    let console = console(FakeStatus::ready(), runner);
    assert!(!console.readiness().ready);

    console.start_status_polling(Duration::from_secs(30));
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(console.readiness().ready);

    console.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_watch_prints_each_refresh() {
    let runner = FakeRunner::new(Behavior::Respond(TaskResponse::succeeded("ok")));
    let console = console(FakeStatus::ready(), runner);

    let started = tokio::time::Instant::now();
    let mut out = Vec::new();
    rosa_console::cli::watch_status(&console, Duration::from_secs(30), Some(3), &mut out)
        .await
        .unwrap();

    // First refresh is immediate, then one per period
    assert_eq!(started.elapsed(), Duration::from_secs(60));
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.matches("readiness: ready").count(), 3);
}
