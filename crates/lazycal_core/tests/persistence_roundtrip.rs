use chrono::{NaiveDate, TimeZone, Utc};
use lazycal_core::{
    EventId, EventPersistence, EventRecord, EventTime, MemorySlotRepository,
    SqliteSlotRepository, DEFAULT_SLOT_KEY,
};
use std::collections::HashMap;

fn sample_collection() -> Vec<EventRecord> {
    vec![
        EventRecord::new(
            EventId::new("1").unwrap(),
            "Lunch",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            true,
        ),
        EventRecord::new(
            EventId::new("1717236000123").unwrap(),
            "Review \"Q2\" plan",
            Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap(),
            false,
        )
        .with_end(Utc.with_ymd_and_hms(2024, 6, 3, 15, 30, 0).unwrap()),
        EventRecord::new(
            EventId::generate(),
            "Conference",
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            true,
        )
        .with_end(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()),
        EventRecord::new(
            EventId::new("floating").unwrap(),
            "Gym",
            "2024-06-04T07:30".parse::<EventTime>().unwrap(),
            false,
        ),
    ]
}

fn by_id(records: &[EventRecord]) -> HashMap<&str, &EventRecord> {
    records.iter().map(|r| (r.id.as_str(), r)).collect()
}

#[test]
fn memory_round_trip_preserves_every_field() {
    let records = sample_collection();
    let mut persistence = EventPersistence::with_default_key(MemorySlotRepository::new());

    persistence.save(&records).unwrap();
    let loaded = persistence.load();

    assert_eq!(by_id(&loaded), by_id(&records));
}

#[test]
fn sqlite_round_trip_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.db");
    let records = sample_collection();

    {
        let repo = SqliteSlotRepository::open(&path).unwrap();
        let mut persistence = EventPersistence::with_default_key(repo);
        persistence.save(&records).unwrap();
    }

    let repo = SqliteSlotRepository::open(&path).unwrap();
    let loaded = EventPersistence::with_default_key(repo).load();
    assert_eq!(loaded, records);
}

#[test]
fn save_overwrites_previous_value() {
    let repo = MemorySlotRepository::new();
    let mut persistence = EventPersistence::with_default_key(repo.clone());

    persistence.save(&sample_collection()).unwrap();
    persistence.save(&[]).unwrap();

    assert_eq!(repo.raw(DEFAULT_SLOT_KEY).as_deref(), Some("[]"));
    assert!(persistence.load().is_empty());
}

#[test]
fn single_all_day_record_round_trips() {
    let lunch = EventRecord::new(
        EventId::new("1").unwrap(),
        "Lunch",
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        true,
    );
    let mut persistence = EventPersistence::with_default_key(MemorySlotRepository::new());

    persistence.save(std::slice::from_ref(&lunch)).unwrap();

    assert_eq!(persistence.load(), vec![lunch]);
}

#[test]
fn load_accepts_widget_serialized_slot() {
    let repo = MemorySlotRepository::new();
    repo.set_raw(
        DEFAULT_SLOT_KEY,
        r#"[
            {"id":"1717236000000","title":"Standup","start":"2024-06-01T09:00:00.000Z","allDay":false},
            {"id":"2","title":"Holiday","start":"2024-06-05","end":"2024-06-07","allDay":true,"extendedProps":{}}
        ]"#,
    );

    let loaded = EventPersistence::with_default_key(repo).load();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].start.to_string(), "2024-06-01T09:00:00Z");
    assert_eq!(loaded[1].end.map(|end| end.to_string()).as_deref(), Some("2024-06-07"));
}

#[test]
fn sqlite_load_of_garbage_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteSlotRepository::open(dir.path().join("bad.db")).unwrap();
    repo.connection()
        .execute(
            "INSERT INTO slots (key, value) VALUES (?1, ?2);",
            [DEFAULT_SLOT_KEY, "null"],
        )
        .unwrap();

    assert!(EventPersistence::with_default_key(repo).load().is_empty());
}
