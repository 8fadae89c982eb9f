use lazycal_core::{
    BridgeError, CalendarSession, EventId, EventPersistence, EventRecord, EventTime,
    IntentOutcome, MemorySlotRepository, ObserverResult, StoreError, TitleRequest,
    TitleResponse, ViewMode, WidgetIntent, DEFAULT_SLOT_KEY,
};
use std::cell::RefCell;
use std::rc::Rc;

fn memory_session() -> (CalendarSession, MemorySlotRepository) {
    let repo = MemorySlotRepository::new();
    let session = CalendarSession::open(EventPersistence::with_default_key(repo.clone())).unwrap();
    (session, repo)
}

fn stored(repo: &MemorySlotRepository) -> Vec<EventRecord> {
    EventPersistence::with_default_key(repo.clone()).load()
}

fn date_click(session: &mut CalendarSession, date: &str, all_day: bool) -> TitleRequest {
    let date: EventTime = date.parse().unwrap();
    match session
        .handle_intent(WidgetIntent::DateClick { date, all_day })
        .unwrap()
    {
        IntentOutcome::TitleRequested(request) => request,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

fn answer(session: &mut CalendarSession, request: &TitleRequest, title: Option<&str>) -> IntentOutcome {
    session
        .fulfill_title(TitleResponse {
            request_id: request.request_id,
            title: title.map(str::to_string),
        })
        .unwrap()
}

#[test]
fn date_click_creates_record_after_title_and_persists_it() {
    let (mut session, repo) = memory_session();

    let request = date_click(&mut session, "2024-06-01", true);
    assert!(session.snapshot().is_empty());
    assert_eq!(session.pending_title_requests(), vec![request.clone()]);

    let outcome = answer(&mut session, &request, Some("Lunch"));

    let id = match outcome {
        IntentOutcome::Added(id) => id,
        other => panic!("expected Added, got {other:?}"),
    };
    let record = session.store().get(&id).unwrap();
    assert_eq!(record.title, "Lunch");
    assert_eq!(record.start.to_string(), "2024-06-01");
    assert!(record.all_day);
    assert_eq!(record.end, None);
    assert_eq!(stored(&repo), session.snapshot());
    assert!(session.pending_title_requests().is_empty());
}

#[test]
fn cancelled_or_empty_title_adds_nothing() {
    let (mut session, repo) = memory_session();

    let cancelled = date_click(&mut session, "2024-06-01", true);
    let empty = date_click(&mut session, "2024-06-02T10:00:00Z", false);

    assert_eq!(
        answer(&mut session, &cancelled, None),
        IntentOutcome::Cancelled(cancelled.request_id)
    );
    assert_eq!(
        answer(&mut session, &empty, Some("")),
        IntentOutcome::Cancelled(empty.request_id)
    );
    assert!(session.snapshot().is_empty());
    assert!(repo.raw(DEFAULT_SLOT_KEY).is_none());
}

#[test]
fn titles_are_stored_exactly_as_typed() {
    let (mut session, repo) = memory_session();

    let padded = date_click(&mut session, "2024-06-01", true);
    let spaces = date_click(&mut session, "2024-06-02", true);

    let padded_id = match answer(&mut session, &padded, Some("  Lunch  ")) {
        IntentOutcome::Added(id) => id,
        other => panic!("expected Added, got {other:?}"),
    };
    let spaces_id = match answer(&mut session, &spaces, Some("   ")) {
        IntentOutcome::Added(id) => id,
        other => panic!("expected Added, got {other:?}"),
    };

    assert_eq!(session.store().get(&padded_id).unwrap().title, "  Lunch  ");
    assert_eq!(session.store().get(&spaces_id).unwrap().title, "   ");
    let titles: Vec<String> = stored(&repo).into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["  Lunch  ".to_string(), "   ".to_string()]);
}

#[test]
fn cancelling_all_title_requests_drops_them() {
    let (mut session, _repo) = memory_session();
    let first = date_click(&mut session, "2024-06-01", true);
    date_click(&mut session, "2024-06-02", true);

    assert_eq!(session.cancel_title_requests(), 2);
    assert!(session.pending_title_requests().is_empty());
    assert!(matches!(
        session.fulfill_title(TitleResponse {
            request_id: first.request_id,
            title: Some("Late".to_string()),
        }),
        Err(BridgeError::UnknownRequest(_))
    ));
    assert!(session.snapshot().is_empty());
}

#[test]
fn answering_a_request_twice_is_rejected() {
    let (mut session, _repo) = memory_session();
    let request = date_click(&mut session, "2024-06-01", true);
    answer(&mut session, &request, Some("Once"));

    let err = session
        .fulfill_title(TitleResponse {
            request_id: request.request_id,
            title: Some("Twice".to_string()),
        })
        .unwrap_err();

    assert!(matches!(err, BridgeError::UnknownRequest(id) if id == request.request_id));
    assert_eq!(session.snapshot().len(), 1);
}

#[test]
fn widget_intents_flow_through_to_storage() {
    let (mut session, repo) = memory_session();
    let dragged = EventRecord::new(
        EventId::new("drag-1").unwrap(),
        "Focus block",
        "2024-06-03T13:00:00Z".parse::<EventTime>().unwrap(),
        false,
    )
    .with_end("2024-06-03T15:00:00Z".parse::<EventTime>().unwrap());

    session
        .handle_intent(WidgetIntent::EventAdded(dragged.clone()))
        .unwrap();
    assert_eq!(stored(&repo), vec![dragged.clone()]);

    let moved = EventRecord {
        start: "2024-06-04T13:00:00Z".parse().unwrap(),
        end: Some("2024-06-04T16:00:00Z".parse().unwrap()),
        ..dragged.clone()
    };
    let outcome = session
        .handle_intent(WidgetIntent::EventChanged(moved.clone()))
        .unwrap();
    assert_eq!(
        outcome,
        IntentOutcome::Updated {
            id: dragged.id.clone(),
            matched: true
        }
    );
    assert_eq!(stored(&repo), vec![moved]);

    session
        .handle_intent(WidgetIntent::EventRemoved(dragged.id.clone()))
        .unwrap();
    assert!(stored(&repo).is_empty());
    assert!(session.snapshot().is_empty());
}

#[test]
fn duplicate_drag_create_is_rejected_and_not_persisted_twice() {
    let (mut session, repo) = memory_session();
    let record = EventRecord::new(
        EventId::new("dup").unwrap(),
        "x",
        "2024-06-01".parse::<EventTime>().unwrap(),
        true,
    );

    session
        .handle_intent(WidgetIntent::EventAdded(record.clone()))
        .unwrap();
    let err = session
        .handle_intent(WidgetIntent::EventAdded(record.clone()))
        .unwrap_err();

    assert!(matches!(err, BridgeError::Store(StoreError::DuplicateId(_))));
    assert_eq!(stored(&repo), vec![record]);
}

#[test]
fn reopening_restores_events_without_rewriting_slot() {
    let repo = MemorySlotRepository::new();
    repo.set_raw(
        DEFAULT_SLOT_KEY,
        r#"[{"id":"1","title":"Lunch","start":"2024-06-01","allDay":true,"color":"red"}]"#,
    );

    let session = CalendarSession::open(EventPersistence::with_default_key(repo.clone())).unwrap();

    assert_eq!(session.snapshot().len(), 1);
    assert!(session.is_persistent());
    // Unknown fields would be dropped by a rewrite; the raw slot is untouched.
    assert!(repo.raw(DEFAULT_SLOT_KEY).unwrap().contains("color"));
}

#[test]
fn malformed_slot_opens_empty_session() {
    let repo = MemorySlotRepository::new();
    repo.set_raw(DEFAULT_SLOT_KEY, "[{\"id\":");

    let session = CalendarSession::open(EventPersistence::with_default_key(repo)).unwrap();

    assert!(session.snapshot().is_empty());
}

#[test]
fn storage_write_failure_surfaces_from_the_triggering_intent() {
    let repo = MemorySlotRepository::with_quota(16);
    let mut session = CalendarSession::open(EventPersistence::with_default_key(repo)).unwrap();
    let request = date_click(&mut session, "2024-06-01", true);

    let err = session
        .fulfill_title(TitleResponse {
            request_id: request.request_id,
            title: Some("A title long enough to blow the quota".to_string()),
        })
        .unwrap_err();

    assert!(matches!(
        err,
        BridgeError::Store(StoreError::Observer { .. })
    ));
}

#[test]
fn view_switches_leave_event_data_alone() {
    let (mut session, repo) = memory_session();
    let request = date_click(&mut session, "2024-06-01", true);
    answer(&mut session, &request, Some("Lunch"));
    let before = session.snapshot().to_vec();
    let slot_before = repo.raw(DEFAULT_SLOT_KEY);

    session.set_view(ViewMode::Week);
    session.set_view(ViewMode::Month);

    assert_eq!(session.active_view(), ViewMode::Month);
    assert_eq!(session.snapshot(), before.as_slice());
    assert_eq!(repo.raw(DEFAULT_SLOT_KEY), slot_before);
}

#[test]
fn render_model_reflects_store_and_view() {
    let (mut session, _repo) = memory_session();
    session.set_view(ViewMode::Day);
    let request = date_click(&mut session, "2024-06-01T09:30", false);
    answer(&mut session, &request, Some("Call"));

    let model = session.render_model();

    assert_eq!(model.active_view, ViewMode::Day);
    assert_eq!(model.records, session.snapshot());
    assert!(model.editable);
    assert!(model.droppable);

    session.reset_view();
    assert_eq!(session.render_model().active_view, ViewMode::Month);
}

#[test]
fn renderer_subscription_runs_after_persistence() {
    let (mut session, repo) = memory_session();
    let observed: Rc<RefCell<Vec<Option<String>>>> = Rc::default();
    let sink = Rc::clone(&observed);
    let probe = repo.clone();
    let renderer = session.subscribe(move |_: &[EventRecord]| -> ObserverResult {
        sink.borrow_mut().push(probe.raw(DEFAULT_SLOT_KEY));
        Ok(())
    });

    let request = date_click(&mut session, "2024-06-01", true);
    answer(&mut session, &request, Some("Lunch"));

    let seen = observed.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].as_deref().unwrap().contains("Lunch"));
    drop(seen);

    assert!(session.unsubscribe(renderer));
}
