//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `daybook_core` linkage and the event snapshot store.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `daybook_cli [DB_PATH] [LOG_DIR]`. Without a path an in-memory
//! database is used. With an absolute `LOG_DIR`, core logging starts at the
//! build's default level.

use chrono::{NaiveDate, NaiveTime};
use daybook_core::db::{open_db, open_db_in_memory};
use daybook_core::{
    Calendar, CalendarConfig, EventRepository, NewEvent, SqliteEventRepository, SystemClock,
    UuidIdGenerator,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("daybook_core ping={}", daybook_core::ping());
    println!("daybook_core version={}", daybook_core::core_version());

    let mut args = std::env::args().skip(1);
    let db_path = args.next();
    if let Some(log_dir) = args.next() {
        let level = daybook_core::default_log_level();
        daybook_core::init_logging(level.as_str(), &log_dir)?;
        println!("daybook_core log_level={}", level.as_str());
    }

    let mut conn = match db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let mut repo = SqliteEventRepository::try_new(&mut conn)?;
    let mut calendar = Calendar::restore(
        CalendarConfig::default(),
        UuidIdGenerator,
        SystemClock,
        repo.load_events()?,
    )?;
    println!("daybook_core events_loaded={}", calendar.len());

    if calendar.is_empty() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).ok_or("invalid probe date")?;
        let probe = NewEvent {
            title: "Smoke probe".to_string(),
            description: String::new(),
            date,
            start_at: NaiveTime::from_hms_opt(9, 0, 0).ok_or("invalid probe time")?,
            end_at: NaiveTime::from_hms_opt(9, 15, 0).ok_or("invalid probe time")?,
        };
        calendar.create_event(&probe)?;
        repo.save_events(calendar.events())?;
        println!(
            "daybook_core probe_free_windows={}",
            calendar.free_windows(date).len()
        );
    }

    println!("daybook_core days_in_use={}", calendar.days().count());
    Ok(())
}
