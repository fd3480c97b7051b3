//! Reminder scheduling: which reminders should fire now, and where a
//! repeating reminder goes after it fires.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::models::{Reminder, RepeatRule};
use crate::parser::datetime::days_in_month;

/// Open reminders whose notification window has started: `due` minus the
/// lead time is at or before `now`.
pub fn due_reminders(conn: &Connection, now: NaiveDateTime) -> Result<Vec<Reminder>> {
    let open = db::list_reminders(conn, false)?;
    Ok(open
        .into_iter()
        .filter(|r| r.due - Duration::minutes(i64::from(r.remind_before)) <= now)
        .collect())
}

/// The slot a repeating reminder moves to after firing. One-shot reminders
/// have no next slot. Monthly rules land on the anchor day of the next
/// month, clamped to its length.
pub fn next_occurrence(due: NaiveDateTime, repeat: &RepeatRule) -> Option<NaiveDateTime> {
    match *repeat {
        RepeatRule::None => None,
        RepeatRule::Daily => Some(due + Duration::days(1)),
        RepeatRule::Weekly(_) => Some(due + Duration::days(7)),
        RepeatRule::Monthly(day) => {
            let (year, month) = if due.month() == 12 {
                (due.year() + 1, 1)
            } else {
                (due.year(), due.month() + 1)
            };
            let clamped = day.min(days_in_month(year, month));
            NaiveDate::from_ymd_opt(year, month, clamped)
                .map(|date| NaiveDateTime::new(date, due.time()))
        }
    }
}

/// Marks a fired one-shot reminder done, or rolls a repeating one forward.
pub fn advance_reminder(conn: &Connection, reminder: &Reminder) -> Result<()> {
    match next_occurrence(reminder.due, &reminder.repeat) {
        Some(next) => db::reschedule_reminder(conn, reminder.id, next),
        None => db::mark_reminder_done(conn, reminder.id),
    }
}
