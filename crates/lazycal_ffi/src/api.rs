//! FFI use-case API for the calendar widget host.
//!
//! # Responsibility
//! - Expose the calendar session to Dart via FRB as sync calls.
//! - Convert widget payloads (strings, flags) into core types and back.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - One session per UI thread; calls before `calendar_open` fail with a
//!   message instead of touching storage.
//! - Timestamps cross the boundary as ISO-8601-like strings.

use lazycal_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CalendarSession, CoreConfig, EventId, EventRecord, EventTime, IntentOutcome, TitleRequestId,
    TitleResponse, ViewMode, WidgetIntent,
};
use log::warn;
use std::cell::RefCell;
use std::path::PathBuf;

thread_local! {
    static SESSION: RefCell<Option<CalendarSession>> = const { RefCell::new(None) };
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One event as seen by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventItem {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub all_day: bool,
}

/// Render input envelope for the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarRenderState {
    pub items: Vec<CalendarEventItem>,
    /// Widget view name (`dayGridMonth|timeGridWeek|timeGridDay`).
    pub active_view: String,
    pub editable: bool,
    pub droppable: bool,
    /// Empty on success, diagnostic text otherwise.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarActionResponse {
    pub ok: bool,
    /// Affected event id, when the action touched one.
    pub event_id: Option<String>,
    /// Set by `calendar_date_click`; answer it with `calendar_submit_title`.
    pub title_request_id: Option<u64>,
    pub message: String,
}

impl CalendarActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            event_id: None,
            title_request_id: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            event_id: None,
            title_request_id: None,
            message: message.into(),
        }
    }

    fn from_outcome(outcome: IntentOutcome) -> Self {
        match outcome {
            IntentOutcome::TitleRequested(request) => Self {
                title_request_id: Some(request.request_id.0),
                ..Self::success("Title requested.")
            },
            IntentOutcome::Added(id) => Self {
                event_id: Some(id.to_string()),
                ..Self::success("Event added.")
            },
            IntentOutcome::Updated { id, matched } => Self {
                event_id: Some(id.to_string()),
                ..Self::success(if matched {
                    "Event updated."
                } else {
                    "No event with this id; nothing updated."
                })
            },
            IntentOutcome::Removed { id, matched } => Self {
                event_id: Some(id.to_string()),
                ..Self::success(if matched {
                    "Event removed."
                } else {
                    "No event with this id; nothing removed."
                })
            },
            IntentOutcome::Cancelled(_) => Self::success("Event creation cancelled."),
        }
    }
}

/// Opens the calendar session for this UI thread.
///
/// `db_path` overrides `LAZYCAL_DB_PATH`; the slot key comes from
/// `LAZYCAL_SLOT_KEY`. Reopening replaces the previous session.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_open(db_path: Option<String>) -> CalendarActionResponse {
    let mut config = CoreConfig::from_env();
    if let Some(path) = db_path.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
        config.db_path = PathBuf::from(path);
    }

    match CalendarSession::open_sqlite(&config.db_path, &config.slot_key) {
        Ok(session) => {
            let count = session.snapshot().len();
            SESSION.with(|slot| *slot.borrow_mut() = Some(session));
            CalendarActionResponse::success(format!("Loaded {count} event(s)."))
        }
        Err(err) => CalendarActionResponse::failure(format!("calendar_open failed: {err}")),
    }
}

/// Returns the widget render input.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_render_state() -> CalendarRenderState {
    SESSION.with(|slot| match slot.borrow().as_ref() {
        Some(session) => {
            let model = session.render_model();
            CalendarRenderState {
                items: model.records.iter().map(to_item).collect(),
                active_view: model.active_view.widget_name().to_string(),
                editable: model.editable,
                droppable: model.droppable,
                message: String::new(),
            }
        }
        None => CalendarRenderState {
            items: Vec::new(),
            active_view: ViewMode::default().widget_name().to_string(),
            editable: true,
            droppable: true,
            message: "calendar_render_state failed: calendar is not open".to_string(),
        },
    })
}

/// Reports a click on an empty cell; returns a title request id.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_date_click(date: String, all_day: bool) -> CalendarActionResponse {
    let date = match date.parse::<EventTime>() {
        Ok(date) => date,
        Err(err) => {
            return CalendarActionResponse::failure(format!("calendar_date_click failed: {err}"))
        }
    };
    apply_intent("calendar_date_click", WidgetIntent::DateClick { date, all_day })
}

/// Answers a title request. `None` or an empty title cancels creation.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_submit_title(request_id: u64, title: Option<String>) -> CalendarActionResponse {
    with_session("calendar_submit_title", |session| {
        session
            .fulfill_title(TitleResponse {
                request_id: TitleRequestId(request_id),
                title,
            })
            .map(CalendarActionResponse::from_outcome)
            .map_err(|err| err.to_string())
    })
}

/// Drops every unanswered title request, e.g. when the title dialog is torn
/// down without a reply.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_cancel_title_requests() -> CalendarActionResponse {
    with_session("calendar_cancel_title_requests", |session| {
        let dropped = session.cancel_title_requests();
        Ok(CalendarActionResponse::success(format!(
            "Dropped {dropped} title request(s)."
        )))
    })
}

/// Reports an event the widget created itself (e.g. drag-create).
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_event_added(item: CalendarEventItem) -> CalendarActionResponse {
    match to_record(item) {
        Ok(record) => apply_intent("calendar_event_added", WidgetIntent::EventAdded(record)),
        Err(err) => CalendarActionResponse::failure(format!("calendar_event_added failed: {err}")),
    }
}

/// Reports a moved or resized event.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_event_changed(item: CalendarEventItem) -> CalendarActionResponse {
    match to_record(item) {
        Ok(record) => apply_intent("calendar_event_changed", WidgetIntent::EventChanged(record)),
        Err(err) => {
            CalendarActionResponse::failure(format!("calendar_event_changed failed: {err}"))
        }
    }
}

/// Reports an event removed from the calendar.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_event_removed(event_id: String) -> CalendarActionResponse {
    match EventId::new(event_id) {
        Ok(id) => apply_intent("calendar_event_removed", WidgetIntent::EventRemoved(id)),
        Err(err) => {
            CalendarActionResponse::failure(format!("calendar_event_removed failed: {err}"))
        }
    }
}

/// Switches the active view (`month|week|day` or a widget view name).
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_set_view(view: String) -> CalendarActionResponse {
    let mode = match view.parse::<ViewMode>() {
        Ok(mode) => mode,
        Err(err) => {
            return CalendarActionResponse::failure(format!("calendar_set_view failed: {err}"))
        }
    };
    with_session("calendar_set_view", |session| {
        session.set_view(mode);
        Ok(CalendarActionResponse::success(format!("View set to {mode}.")))
    })
}

/// Returns to the default month view.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_reset_view() -> CalendarActionResponse {
    with_session("calendar_reset_view", |session| {
        session.reset_view();
        Ok(CalendarActionResponse::success("View reset."))
    })
}

fn apply_intent(operation: &str, intent: WidgetIntent) -> CalendarActionResponse {
    with_session(operation, |session| {
        session
            .handle_intent(intent)
            .map(CalendarActionResponse::from_outcome)
            .map_err(|err| err.to_string())
    })
}

fn with_session(
    operation: &str,
    f: impl FnOnce(&mut CalendarSession) -> Result<CalendarActionResponse, String>,
) -> CalendarActionResponse {
    SESSION.with(|slot| {
        let mut slot = slot.borrow_mut();
        let Some(session) = slot.as_mut() else {
            return CalendarActionResponse::failure(format!(
                "{operation} failed: calendar is not open"
            ));
        };
        f(session).unwrap_or_else(|err| {
            warn!("event=ffi_call module=ffi status=error operation={operation}");
            CalendarActionResponse::failure(format!("{operation} failed: {err}"))
        })
    })
}

fn to_item(record: &EventRecord) -> CalendarEventItem {
    CalendarEventItem {
        id: record.id.to_string(),
        title: record.title.clone(),
        start: record.start.to_string(),
        end: record.end.map(|end| end.to_string()),
        all_day: record.all_day,
    }
}

fn to_record(item: CalendarEventItem) -> Result<EventRecord, String> {
    let id = EventId::new(item.id).map_err(|err| err.to_string())?;
    let start = item
        .start
        .parse::<EventTime>()
        .map_err(|err| err.to_string())?;
    let end = item
        .end
        .as_deref()
        .map(str::parse::<EventTime>)
        .transpose()
        .map_err(|err| err.to_string())?;

    Ok(EventRecord {
        id,
        title: item.title,
        start,
        end,
        all_day: item.all_day,
    })
}
