use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::{self, get_connection};
use crate::error::Result;
use crate::fmt;
use crate::reminders::{advance_reminder, due_reminders};
use crate::settings::db_path;

pub fn list(all: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let reminders = db::list_reminders(&conn, all)?;
    if reminders.is_empty() {
        println!("沒有提醒。");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "內容", "時間", "提前", "重複", "狀態"]);
    for r in &reminders {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.content),
            Cell::new(fmt::friendly_datetime(r.due)),
            Cell::new(format!("{}分鐘", r.remind_before)),
            Cell::new(r.repeat.describe().unwrap_or_default()),
            Cell::new(if r.is_done { "完成" } else { "" }),
        ]);
    }
    println!("提醒\n{table}");
    Ok(())
}

/// Prints reminders whose window is open, then rolls each one over:
/// one-shots complete, repeating ones move to the next slot.
pub fn due() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let now = Local::now().naive_local();
    let fired = due_reminders(&conn, now)?;
    if fired.is_empty() {
        println!("目前沒有到期的提醒。");
        return Ok(());
    }
    for reminder in &fired {
        println!(
            "{} {} — {}",
            "⏰".yellow(),
            fmt::friendly_datetime(reminder.due),
            reminder.content
        );
        advance_reminder(&conn, reminder)?;
    }
    Ok(())
}
