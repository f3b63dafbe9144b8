use chrono::{NaiveDate, NaiveTime};
use daybook_core::db::open_db;
use daybook_core::db::{open_db_in_memory, DbError};
use daybook_core::{
    Calendar, CalendarConfig, EventRepository, FixedClock, NewEvent, ReminderKind, RepoError,
    SequentialIdGenerator, SqliteEventRepository,
};
use rusqlite::Connection;

type TestCalendar = Calendar<SequentialIdGenerator, FixedClock>;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn sample_calendar() -> TestCalendar {
    let mut calendar = Calendar::with_parts(
        CalendarConfig::default(),
        SequentialIdGenerator::default(),
        FixedClock(date(1)),
    );
    let standup = calendar
        .create_event(&NewEvent {
            title: "Standup".to_string(),
            description: "daily".to_string(),
            date: date(10),
            start_at: t(9, 0),
            end_at: t(9, 15),
        })
        .unwrap();
    calendar
        .create_event(&NewEvent {
            title: "Late review".to_string(),
            description: String::new(),
            date: date(10),
            start_at: t(23, 0),
            end_at: t(0, 0),
        })
        .unwrap();
    let first = date(10).and_hms_opt(8, 45, 0).unwrap();
    let second = date(9).and_hms_opt(18, 0, 0).unwrap();
    calendar
        .add_reminder(&standup, first, ReminderKind::System)
        .unwrap();
    calendar
        .add_reminder(&standup, second, ReminderKind::Email)
        .unwrap();
    calendar
}

fn restore(events: Vec<daybook_core::Event>) -> TestCalendar {
    Calendar::restore(
        CalendarConfig::default(),
        SequentialIdGenerator::new("next"),
        FixedClock(date(1)),
        events,
    )
    .ok()
    .unwrap()
}

#[test]
fn save_and_load_roundtrip_preserves_events_and_slots() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();
    let calendar = sample_calendar();

    repo.save_events(calendar.events()).unwrap();
    let loaded = repo.load_events().unwrap();

    assert_eq!(loaded.as_slice(), calendar.events());
    let restored = restore(loaded);
    assert_eq!(restored.day(date(10)), calendar.day(date(10)));
}

#[test]
fn reminder_fire_at_keeps_sub_second_precision() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();
    let mut calendar = sample_calendar();
    let precise = date(10).and_hms_nano_opt(8, 50, 0, 123_456_789).unwrap();
    let millis = date(10).and_hms_milli_opt(8, 45, 0, 500).unwrap();
    calendar
        .add_reminder("evt-2", precise, ReminderKind::Email)
        .unwrap();
    calendar
        .add_reminder("evt-2", millis, ReminderKind::System)
        .unwrap();

    repo.save_events(calendar.events()).unwrap();
    let loaded = repo.load_events().unwrap();

    let fire_times: Vec<_> = loaded[1].reminders.iter().map(|r| r.fire_at).collect();
    assert_eq!(fire_times, vec![precise, millis]);
    assert_eq!(loaded.as_slice(), calendar.events());
}

#[test]
fn save_replaces_previous_snapshot() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();
    let mut calendar = sample_calendar();
    repo.save_events(calendar.events()).unwrap();

    calendar.delete_event("evt-1").unwrap();
    repo.save_events(calendar.events()).unwrap();

    let loaded = repo.load_events().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "evt-2");
    drop(repo);

    let orphaned: i64 = conn
        .query_row("SELECT COUNT(*) FROM reminders;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn snapshot_survives_reopening_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daybook.db");
    let calendar = sample_calendar();

    {
        let mut conn = open_db(&path).unwrap();
        let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();
        repo.save_events(calendar.events()).unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    let repo = SqliteEventRepository::try_new(&mut conn).unwrap();
    let loaded = repo.load_events().unwrap();
    assert_eq!(loaded.as_slice(), calendar.events());
}

#[test]
fn load_rejects_malformed_rows() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO events (id, position, title, description, date, start_at, end_at)
         VALUES ('bad', 0, 't', '', '2024-13-40', '09:00', '10:00');",
        [],
    )
    .unwrap();

    let repo = SqliteEventRepository::try_new(&mut conn).unwrap();
    let err = repo.load_events().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("events.date")));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteEventRepository::try_new(&mut conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::Db(DbError::SchemaMissing { table: "events" })
    ));
}
