mod common;

use std::time::Duration;

use atrium::collection::RecordId;
use atrium::error::ErrorKind;
use atrium::notify::{Level, Notification};
use atrium::session::AuthState;
use atrium::view::{
    FetchState, MutationState, PageClampPolicy, QueryParameters, ViewOptions, ViewSnapshot,
};

use common::{Fail, ScriptedSource, Widget, drain, spawn_view};

fn keywords(source: &ScriptedSource) -> Vec<String> {
    source.fetch_log().into_iter().map(|p| p.keyword).collect()
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(30), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached");
}

fn names(snapshot: &ViewSnapshot<Widget>) -> Vec<String> {
    snapshot
        .result()
        .map(|r| r.items.iter().map(|w| w.name.clone()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_page_of_twenty_five() {
    let h = spawn_view(ScriptedSource::with_widgets(25), ViewOptions::default(), true);

    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.page, 1);
    assert_eq!(snap.total_count(), Some(25));
    assert_eq!(snap.result().unwrap().items.len(), 10);
    assert_eq!(snap.first_item_index(), 1);
    assert_eq!(snap.last_item_index(), 10);
    assert!(snap.has_next());
    assert!(!snap.has_previous());
    assert_eq!(
        h.source.fetch_log(),
        vec![QueryParameters::new(10, 0, "")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_paging_forward_and_back() {
    let h = spawn_view(ScriptedSource::with_widgets(25), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.next_page().unwrap();
    h.view.next_page().unwrap();
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.page, 3);
    assert_eq!(snap.first_item_index(), 21);
    assert_eq!(snap.last_item_index(), 25);
    assert!(!snap.has_next());
    assert_eq!(
        names(&snap),
        vec!["widget-21", "widget-22", "widget-23", "widget-24", "widget-25"]
    );

    h.view.previous_page().unwrap();
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.page, 2);
    assert!(snap.has_previous());
    assert!(snap.has_next());
}

#[tokio::test(start_paused = true)]
async fn test_next_on_last_page_is_noop() {
    let h = spawn_view(
        ScriptedSource::with_widgets(25),
        ViewOptions::default().with_page(3),
        true,
    );
    h.view.settled().await.unwrap();
    assert_eq!(h.source.fetch_count(), 1);

    h.view.next_page().unwrap();
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.page, 3);
    assert_eq!(h.source.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_previous_on_first_page_is_noop() {
    let h = spawn_view(ScriptedSource::with_widgets(5), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.previous_page().unwrap();
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.page, 1);
    assert_eq!(h.source.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_next_page_ignored_while_total_unknown() {
    let source = ScriptedSource::with_widgets(25);
    let first = QueryParameters::new(10, 0, "");
    source.hold(first.clone());
    let h = spawn_view(source, ViewOptions::default(), true);

    h.view.next_page().unwrap();
    drain().await;
    assert_eq!(h.view.snapshot().page, 1);

    h.source.release(&first);
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.page, 1);
    assert_eq!(h.source.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_collection() {
    let h = spawn_view(ScriptedSource::with_widgets(0), ViewOptions::default(), true);
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.total_count(), Some(0));
    assert!(snap.result().unwrap().is_empty());
    assert!(!snap.has_next());
    assert_eq!(snap.last_item_index(), 0);
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_burst_of_keystrokes_fetches_last_value_once() {
    let h = spawn_view(
        ScriptedSource::with_names(["Acme", "Acme Labs", "Globex"]),
        ViewOptions::default(),
        true,
    );
    h.view.settled().await.unwrap();

    h.view.keystroke("acme").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    h.view.keystroke("acm").unwrap();
    drain().await;

    let snap = h.view.snapshot();
    assert_eq!(snap.raw_keyword, "acm");
    assert_eq!(snap.keyword, "");
    assert!(snap.settling);

    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.keyword, "acm");
    assert_eq!(snap.total_count(), Some(2));
    assert_eq!(keywords(&h.source), vec!["", "acm"]);
}

#[tokio::test(start_paused = true)]
async fn test_stabilized_keyword_resets_page() {
    let h = spawn_view(ScriptedSource::with_widgets(25), ViewOptions::default(), true);
    h.view.settled().await.unwrap();
    h.view.go_to_page(3).unwrap();
    assert_eq!(h.view.settled().await.unwrap().page, 3);

    h.view.keystroke("widget-1").unwrap();
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.page, 1);
    assert_eq!(
        h.source.fetch_log().last(),
        Some(&QueryParameters::new(10, 0, "widget-1"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_mount_with_keyword_fetches_filtered() {
    let h = spawn_view(
        ScriptedSource::with_names(["Acme", "Globex", "Initech"]),
        ViewOptions::default().with_keyword("glo"),
        true,
    );
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.raw_keyword, "glo");
    assert_eq!(names(&snap), vec!["Globex"]);
    assert_eq!(keywords(&h.source), vec!["glo"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let h = spawn_view(
        ScriptedSource::with_names(["alpha", "beta", "gamma"]),
        ViewOptions::default(),
        true,
    );
    h.view.settled().await.unwrap();

    let slow = QueryParameters::new(10, 0, "a");
    h.source.hold(slow.clone());
    h.view.keystroke("a").unwrap();
    let mut snapshots = h.view.subscribe();
    snapshots
        .wait_for(|s| s.keyword == "a" && s.fetch.is_loading())
        .await
        .unwrap();

    h.view.keystroke("b").unwrap();
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.keyword, "b");
    assert_eq!(names(&snap), vec!["beta"]);

    h.source.release(&slow);
    wait_until(|| h.source.completed_fetches() == 3).await;
    drain().await;

    let snap = h.view.snapshot();
    assert_eq!(snap.keyword, "b");
    assert_eq!(names(&snap), vec!["beta"]);
    assert!(h.notifier.notifications().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_is_silent() {
    let h = spawn_view(
        ScriptedSource::with_names(["alpha", "beta"]),
        ViewOptions::default(),
        true,
    );
    h.view.settled().await.unwrap();

    let slow = QueryParameters::new(10, 0, "a");
    h.source.hold_and_fail(slow.clone(), Fail::Forbidden);
    h.view.keystroke("a").unwrap();
    let mut snapshots = h.view.subscribe();
    snapshots
        .wait_for(|s| s.keyword == "a" && s.fetch.is_loading())
        .await
        .unwrap();

    h.view.keystroke("be").unwrap();
    h.view.settled().await.unwrap();

    h.source.release(&slow);
    wait_until(|| h.source.completed_fetches() == 3).await;
    drain().await;

    assert!(h.notifier.notifications().is_empty());
    assert_eq!(h.guard.invocations(), 0);
    assert_eq!(h.session.state(), AuthState::LoggedIn);
    assert!(matches!(h.view.snapshot().fetch, FetchState::Success(_)));
}

#[tokio::test(start_paused = true)]
async fn test_teardown_cancels_pending_keystroke() {
    let h = spawn_view(ScriptedSource::with_widgets(3), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.keystroke("widget").unwrap();
    let source = h.source.clone();
    h.view.shutdown().await;

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.fetch_count(), 1);
}

// ============================================================================
// Cache-and-network
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_revisited_page_is_served_from_cache_while_refreshing() {
    let h = spawn_view(ScriptedSource::with_widgets(25), ViewOptions::default(), true);
    h.view.settled().await.unwrap();
    h.view.next_page().unwrap();
    h.view.settled().await.unwrap();

    let first = QueryParameters::new(10, 0, "");
    h.source.hold(first.clone());
    h.view.previous_page().unwrap();

    let mut snapshots = h.view.subscribe();
    let cached = snapshots
        .wait_for(|s| s.page == 1 && s.refreshing)
        .await
        .unwrap()
        .clone();
    assert_eq!(cached.result().unwrap().items.len(), 10);
    assert!(!cached.is_settled());

    h.source.release(&first);
    let snap = h.view.settled().await.unwrap();
    assert!(!snap.refreshing);
    assert_eq!(h.source.fetch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_refetch_requests_same_parameters_again() {
    let h = spawn_view(ScriptedSource::with_widgets(4), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.refetch().unwrap();
    h.view.settled().await.unwrap();
    assert_eq!(
        h.source.fetch_log(),
        vec![QueryParameters::new(10, 0, ""), QueryParameters::new(10, 0, "")]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_forbidden_fetch_logs_out_once() {
    let source = ScriptedSource::with_widgets(5);
    source.fail_next_fetch(Fail::Forbidden);
    let h = spawn_view(source, ViewOptions::default(), true);

    let snap = h.view.settled().await.unwrap();
    let info = snap.fetch.error().expect("fetch should fail");
    assert_eq!(info.kind, ErrorKind::Authorization);

    assert_eq!(h.guard.invocations(), 1);
    assert_eq!(h.session.state(), AuthState::LoggedOut);
    assert_eq!(
        h.notifier.notifications(),
        vec![Notification::error("You are not authorized to view widgets.")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_is_reported_without_logout() {
    let source = ScriptedSource::with_widgets(5);
    source.fail_next_fetch(Fail::Network);
    let h = spawn_view(source, ViewOptions::default(), true);

    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.fetch.error().unwrap().kind, ErrorKind::Network);
    assert_eq!(h.guard.invocations(), 0);
    assert_eq!(h.session.state(), AuthState::LoggedIn);

    let errors = h.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("connection refused"));

    // No automatic retry; an explicit refetch recovers.
    assert_eq!(h.source.fetch_count(), 1);
    h.view.refetch().unwrap();
    let snap = h.view.settled().await.unwrap();
    assert_eq!(snap.total_count(), Some(5));
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_delete_on_last_page_clamps() {
    let h = spawn_view(
        ScriptedSource::with_widgets(21),
        ViewOptions::default().with_page(3),
        true,
    );
    let snap = h.view.settled().await.unwrap();
    assert_eq!(names(&snap), vec!["widget-21"]);

    h.view.delete(RecordId(21), "widget-21").unwrap();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(h.notifier.prompts(), vec!["Are you sure to delete widget-21?"]);
    assert_eq!(snap.delete, MutationState::Success);
    assert!(!h.source.contains(RecordId(21)));
    assert_eq!(snap.page, 2);
    assert_eq!(snap.total_count(), Some(20));
    assert_eq!(snap.result().unwrap().items.len(), 10);

    let deleted = &h.notifier.notifications()[0];
    assert_eq!(deleted.level, Level::Success);
    assert_eq!(deleted.title.as_deref(), Some("Deleted!"));
    assert_eq!(deleted.message, "Record has been deleted.");
}

#[tokio::test(start_paused = true)]
async fn test_delete_outside_filter_keeps_page() {
    let labels = (1..=11)
        .map(|i| format!("keep-{i}"))
        .chain(["other".to_string()]);
    let h = spawn_view(
        ScriptedSource::with_names(labels),
        ViewOptions::default().with_keyword("keep").with_page(2),
        true,
    );
    let snap = h.view.settled().await.unwrap();
    assert_eq!(names(&snap), vec!["keep-11"]);
    assert_eq!(snap.total_count(), Some(11));

    h.view.delete(RecordId(12), "other").unwrap();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(snap.delete, MutationState::Success);
    assert!(!h.source.contains(RecordId(12)));
    assert_eq!(snap.page, 2);
    assert_eq!(snap.total_count(), Some(11));
    assert_eq!(names(&snap), vec!["keep-11"]);
    assert_eq!(
        h.source.fetch_log().last(),
        Some(&QueryParameters::new(10, 10, "keep"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_delete_on_last_page_preserves_page() {
    let options = ViewOptions {
        clamp_policy: PageClampPolicy::Preserve,
        ..ViewOptions::default()
    }
    .with_page(3);
    let h = spawn_view(ScriptedSource::with_widgets(21), options, true);
    h.view.settled().await.unwrap();

    h.view.delete(RecordId(21), "widget-21").unwrap();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(snap.page, 3);
    assert_eq!(snap.total_count(), Some(20));
    assert!(snap.result().unwrap().is_empty());
    assert!(!snap.has_next());
    assert!(snap.has_previous());
}

#[tokio::test(start_paused = true)]
async fn test_declined_delete_does_nothing() {
    let h = spawn_view(ScriptedSource::with_widgets(3), ViewOptions::default(), false);
    h.view.settled().await.unwrap();

    h.view.delete(RecordId(1), "widget-1").unwrap();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(h.notifier.prompts(), vec!["Are you sure to delete widget-1?"]);
    assert_eq!(snap.delete, MutationState::Idle);
    assert_eq!(h.source.write_count(), 0);
    assert_eq!(h.source.fetch_count(), 1);
    assert!(h.notifier.notifications().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_create_notifies_and_refetches() {
    let h = spawn_view(ScriptedSource::with_widgets(3), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.create("gizmo".to_string()).unwrap();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(snap.create, MutationState::Success);
    assert_eq!(snap.total_count(), Some(4));
    assert_eq!(snap.last_written.as_ref().map(|w| w.name.as_str()), Some("gizmo"));
    assert_eq!(h.source.fetch_count(), 2);
    assert_eq!(
        h.notifier.notifications(),
        vec![Notification::success("Widget created successfully!")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_update_notifies_and_refetches() {
    let h = spawn_view(ScriptedSource::with_widgets(3), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.update(RecordId(2), "sprocket".to_string()).unwrap();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(snap.update, MutationState::Success);
    assert!(names(&snap).contains(&"sprocket".to_string()));
    assert_eq!(
        h.notifier.notifications(),
        vec![Notification::success("Widget updated successfully!")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_write_reports_once_and_keeps_page() {
    let source = ScriptedSource::with_widgets(3);
    source.fail_next_write(Fail::Conflict);
    let h = spawn_view(source, ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.update(RecordId(1), "widget-2".to_string()).unwrap();
    let snap = h.view.settled().await.unwrap();

    match &snap.update {
        MutationState::Failure(info) => assert_eq!(info.kind, ErrorKind::Conflict),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(h.source.fetch_count(), 1);
    assert_eq!(h.guard.invocations(), 0);
    let errors = h.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "conflict: name already taken");
}

#[tokio::test(start_paused = true)]
async fn test_invalid_draft_is_rejected() {
    let h = spawn_view(ScriptedSource::with_widgets(1), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.create("  ".to_string()).unwrap();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(
        snap.create,
        MutationState::Failure(atrium::ErrorInfo::new(
            ErrorKind::Validation,
            "Name is required."
        ))
    );
    assert_eq!(h.source.len(), 1);
    assert_eq!(h.notifier.errors().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_write_logs_out() {
    let source = ScriptedSource::with_widgets(2);
    source.fail_next_write(Fail::Unauthorized);
    let h = spawn_view(source, ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.delete(RecordId(1), "widget-1").unwrap();
    let snap = h.view.settled().await.unwrap();

    assert!(matches!(snap.delete, MutationState::Failure(_)));
    assert_eq!(h.guard.invocations(), 1);
    assert_eq!(h.session.state(), AuthState::LoggedOut);
    assert!(h.source.contains(RecordId(1)));
}

#[tokio::test(start_paused = true)]
async fn test_write_kinds_are_independent() {
    let source = ScriptedSource::with_widgets(3);
    source.fail_next_write(Fail::NotFound);
    let h = spawn_view(source, ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.view.update(RecordId(99), "ghost".to_string()).unwrap();
    h.view.settled().await.unwrap();
    h.view.create("fresh".to_string()).unwrap();
    let snap = h.view.settled().await.unwrap();

    assert!(matches!(snap.update, MutationState::Failure(_)));
    assert_eq!(snap.create, MutationState::Success);
    assert_eq!(snap.delete, MutationState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_refetch_after_write_uses_page_changed_mid_write() {
    let h = spawn_view(ScriptedSource::with_widgets(15), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.source.hold_writes();
    h.view.create("gizmo".to_string()).unwrap();
    let mut snapshots = h.view.subscribe();
    snapshots
        .wait_for(|s| s.create.is_in_flight())
        .await
        .unwrap();

    h.view.next_page().unwrap();
    snapshots
        .wait_for(|s| s.page == 2 && matches!(s.fetch, FetchState::Success(_)) && !s.refreshing)
        .await
        .unwrap();

    h.source.release_writes();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(snap.create, MutationState::Success);
    assert_eq!(snap.page, 2);
    assert_eq!(snap.total_count(), Some(16));
    assert_eq!(names(&snap).last().map(String::as_str), Some("gizmo"));
    assert_eq!(
        h.source.fetch_log().last(),
        Some(&QueryParameters::new(10, 10, ""))
    );
}

#[tokio::test(start_paused = true)]
async fn test_refetch_after_write_uses_keyword_changed_mid_write() {
    let h = spawn_view(ScriptedSource::with_widgets(15), ViewOptions::default(), true);
    h.view.settled().await.unwrap();

    h.source.hold_writes();
    h.view.update(RecordId(3), "widget-1-renamed".to_string()).unwrap();
    let mut snapshots = h.view.subscribe();
    snapshots
        .wait_for(|s| s.update.is_in_flight())
        .await
        .unwrap();

    h.view.keystroke("widget-1").unwrap();
    snapshots
        .wait_for(|s| {
            s.keyword == "widget-1" && matches!(s.fetch, FetchState::Success(_)) && !s.refreshing
        })
        .await
        .unwrap();

    h.source.release_writes();
    let snap = h.view.settled().await.unwrap();

    assert_eq!(snap.update, MutationState::Success);
    assert_eq!(snap.keyword, "widget-1");
    assert!(names(&snap).contains(&"widget-1-renamed".to_string()));
    assert_eq!(
        h.source.fetch_log().last(),
        Some(&QueryParameters::new(10, 0, "widget-1"))
    );
}
