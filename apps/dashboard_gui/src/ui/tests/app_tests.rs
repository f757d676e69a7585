use super::*;
use client_core::{error::ClientError, notifications::NotificationLevel, resource::RequestTicket};
use crossbeam_channel::bounded;
use serde_json::json;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ActionResponse, ImportDetails, ImportIssue, ImportSummary},
};

struct Harness {
    app: DashboardApp,
    cmd_rx: Receiver<BackendCommand>,
    notifications: Arc<NotificationCenter>,
}

fn start() -> Harness {
    let (cmd_tx, cmd_rx) = bounded(32);
    let (_ui_tx, ui_rx) = bounded(32);
    let notifications = Arc::new(NotificationCenter::default());
    let app = DashboardApp::new(cmd_tx, ui_rx, notifications.clone());
    Harness {
        app,
        cmd_rx,
        notifications,
    }
}

fn drain(rx: &Receiver<BackendCommand>) -> Vec<BackendCommand> {
    rx.try_iter().collect()
}

fn expect_load(cmd: &BackendCommand, expected: EntityKind) -> RequestTicket {
    match cmd {
        BackendCommand::Load { kind, ticket } if *kind == expected => *ticket,
        other => panic!("expected load of {expected}, got {other:?}"),
    }
}

fn products() -> Vec<serde_json::Value> {
    vec![
        json!({ "_id": "p1", "name": "Lamp", "sku": "LAMP-1", "price": 19.9, "stock": 3 }),
        json!({ "_id": "p2", "name": "Desk", "sku": "DESK-1", "price": 120, "stock": 0 }),
    ]
}

fn levels(center: &NotificationCenter) -> Vec<NotificationLevel> {
    center.pending().iter().map(|item| item.level).collect()
}

#[test]
fn starts_by_loading_products() {
    let harness = start();
    let commands = drain(&harness.cmd_rx);
    assert_eq!(commands.len(), 1);
    expect_load(&commands[0], EntityKind::Product);
    assert_eq!(harness.app.active(), EntityKind::Product);
}

#[test]
fn switching_tabs_cancels_the_previous_load() {
    let mut harness = start();
    drain(&harness.cmd_rx);

    harness.app.mount(EntityKind::Order);
    let commands = drain(&harness.cmd_rx);
    assert!(matches!(
        commands[0],
        BackendCommand::CancelLoad {
            kind: EntityKind::Product
        }
    ));
    expect_load(&commands[1], EntityKind::Order);
    assert_eq!(harness.app.active(), EntityKind::Order);
}

#[test]
fn stale_list_responses_are_discarded() {
    let mut harness = start();
    let first = expect_load(&drain(&harness.cmd_rx)[0], EntityKind::Product);
    harness.app.reload(EntityKind::Product);
    let second = expect_load(&drain(&harness.cmd_rx)[0], EntityKind::Product);

    harness.app.handle_event(UiEvent::ListLoaded {
        kind: EntityKind::Product,
        ticket: first,
        result: Ok(products()),
    });
    assert!(harness.app.lists.products.state().is_loading());

    harness.app.handle_event(UiEvent::ListLoaded {
        kind: EntityKind::Product,
        ticket: second,
        result: Ok(products()),
    });
    assert_eq!(harness.app.lists.products.items().len(), 2);
}

#[test]
fn unauthorized_load_points_at_the_token() {
    let mut harness = start();
    let ticket = expect_load(&drain(&harness.cmd_rx)[0], EntityKind::Product);
    harness.app.handle_event(UiEvent::ListLoaded {
        kind: EntityKind::Product,
        ticket,
        result: Err(ClientError::Status {
            status: 401,
            body: ApiError::default(),
        }),
    });
    assert_eq!(harness.app.status(), REAUTH_HINT);
    assert_eq!(
        harness.app.lists.products.state().error(),
        Some("Failed to load products. Please try again later.")
    );
}

#[test]
fn empty_bulk_delete_only_warns() {
    let mut harness = start();
    let ticket = expect_load(&drain(&harness.cmd_rx)[0], EntityKind::Product);
    harness.app.handle_event(UiEvent::ListLoaded {
        kind: EntityKind::Product,
        ticket,
        result: Ok(products()),
    });

    harness.app.request_bulk_delete(EntityKind::Product);
    harness.app.confirm_bulk_delete(EntityKind::Product);

    assert!(drain(&harness.cmd_rx).is_empty());
    assert_eq!(levels(&harness.notifications), vec![NotificationLevel::Warning]);
    assert_eq!(harness.app.lists.products.items().len(), 2);
}

#[test]
fn confirmed_bulk_delete_is_sent_and_applied() {
    let mut harness = start();
    let ticket = expect_load(&drain(&harness.cmd_rx)[0], EntityKind::Product);
    harness.app.handle_event(UiEvent::ListLoaded {
        kind: EntityKind::Product,
        ticket,
        result: Ok(products()),
    });
    let p1 = EntityId::from("p1");
    harness.app.lists.products.toggle_row_selection(&p1);

    harness.app.request_bulk_delete(EntityKind::Product);
    assert!(drain(&harness.cmd_rx).is_empty());
    harness.app.confirm_bulk_delete(EntityKind::Product);

    let ids = match drain(&harness.cmd_rx).pop() {
        Some(BackendCommand::BulkDelete { kind, ids }) => {
            assert_eq!(kind, EntityKind::Product);
            ids
        }
        other => panic!("expected bulk delete, got {other:?}"),
    };
    assert_eq!(ids, vec![p1.clone()]);

    harness.app.handle_event(UiEvent::BulkDeleted {
        kind: EntityKind::Product,
        ids,
        result: Ok(shared::protocol::BulkDeleteResponse {
            success: true,
            message: None,
            failed_ids: Vec::new(),
        }),
    });
    assert_eq!(harness.app.lists.products.items().len(), 1);
    assert_eq!(harness.app.lists.products.selected_count(), 0);
    assert_eq!(harness.app.status(), "Deleted 1 products");
}

#[test]
fn saved_form_closes_and_reloads_the_mounted_list() {
    let mut harness = start();
    harness.app.mount(EntityKind::Customer);
    drain(&harness.cmd_rx);

    harness.app.open_create(EntityKind::Customer);
    assert!(harness.app.customer_form.is_some());

    harness.app.handle_event(UiEvent::Saved {
        kind: EntityKind::Customer,
        id: None,
        result: Ok(ActionResponse {
            success: true,
            message: None,
        }),
    });
    assert!(harness.app.customer_form.is_none());
    expect_load(&drain(&harness.cmd_rx)[0], EntityKind::Customer);
    let pending = harness.notifications.pending();
    assert_eq!(pending[0].message, "Customer created.");
}

#[test]
fn failed_save_keeps_the_form_open() {
    let mut harness = start();
    drain(&harness.cmd_rx);
    harness.app.open_create(EntityKind::LiveEvent);
    if let Some(form) = harness.app.live_event_form.as_mut() {
        form.draft.title = "Spring drop".into();
        form.draft.host = "Mia".into();
        form.draft.scheduled_at = "2026-04-01 18:00".into();
        assert!(matches!(form.submit(), FormOutcome::Submit { .. }));
    }

    harness.app.handle_event(UiEvent::Saved {
        kind: EntityKind::LiveEvent,
        id: None,
        result: Err(ClientError::Status {
            status: 409,
            body: ApiError::new(ErrorCode::Conflict, "Slot already booked"),
        }),
    });

    let form = harness.app.live_event_form.as_ref().expect("form stays open");
    assert!(!form.is_saving());
    let pending = harness.notifications.pending();
    assert_eq!(pending[0].level, NotificationLevel::Error);
    assert_eq!(pending[0].message, "Slot already booked");
    assert!(drain(&harness.cmd_rx).is_empty());
}

#[test]
fn import_reports_summary_and_skipped_rows() {
    let mut harness = start();
    drain(&harness.cmd_rx);

    harness.app.handle_event(UiEvent::Imported {
        kind: EntityKind::Product,
        result: Ok(ImportResponse {
            success: true,
            message: None,
            summary: ImportSummary {
                total: 3,
                successful: 1,
                failed: 1,
                duplicates: 1,
            },
            details: ImportDetails {
                failed: vec![ImportIssue {
                    row: Some(2),
                    key: None,
                    reason: Some("Missing SKU".into()),
                }],
                duplicates: vec![ImportIssue {
                    row: Some(3),
                    key: Some("LAMP-1".into()),
                    reason: None,
                }],
            },
        }),
    });

    let pending = harness.notifications.pending();
    assert_eq!(pending.len(), 2);
    assert_eq!(
        pending[0].message,
        "Imported 1 of 3 rows (1 failed, 1 duplicates)."
    );
    assert_eq!(pending[1].level, NotificationLevel::Warning);
    assert_eq!(
        pending[1].message,
        "Failed row 2: Missing SKU\nDuplicate row 3 (LAMP-1)"
    );
    expect_load(&drain(&harness.cmd_rx)[0], EntityKind::Product);
}

#[test]
fn import_issue_list_is_truncated() {
    let issue = ImportIssue {
        row: Some(1),
        key: None,
        reason: Some("bad".into()),
    };
    let response = ImportResponse {
        success: true,
        message: None,
        summary: ImportSummary::default(),
        details: ImportDetails {
            failed: vec![issue; 8],
            duplicates: Vec::new(),
        },
    };
    let text = import_issues(&response).expect("issues");
    assert_eq!(text.lines().count(), IMPORT_ISSUE_PREVIEW + 1);
    assert!(text.ends_with("…and 3 more"));
}

#[test]
fn detail_for_another_record_is_ignored() {
    let mut harness = start();
    drain(&harness.cmd_rx);
    harness
        .app
        .open_detail(EntityKind::Order, EntityId::from("o1"));
    assert!(matches!(
        drain(&harness.cmd_rx).pop(),
        Some(BackendCommand::Detail { .. })
    ));

    harness.app.handle_event(UiEvent::DetailLoaded {
        kind: EntityKind::Order,
        id: EntityId::from("o2"),
        result: Ok(json!({ "_id": "o2" })),
    });
    let detail = harness.app.detail.as_ref().expect("detail open");
    assert!(detail.state.is_loading());

    harness.app.handle_event(UiEvent::DetailLoaded {
        kind: EntityKind::Order,
        id: EntityId::from("o1"),
        result: Ok(json!({ "_id": "o1" })),
    });
    let detail = harness.app.detail.as_ref().expect("detail open");
    assert_eq!(detail.state.data(), Some(&json!({ "_id": "o1" })));
}
