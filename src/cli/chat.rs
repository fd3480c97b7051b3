use std::io::{self, BufRead, Write};

use chrono::Local;
use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::handler::handle_message;
use crate::reminders::{advance_reminder, due_reminders};
use crate::settings::{db_path, load_settings};

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let settings = load_settings();

    if settings.user_name.is_empty() {
        println!("{}", "你好！記帳、設提醒或查詢，輸入 exit 離開。".cyan());
    } else {
        println!(
            "{}",
            format!("{}你好！記帳、設提醒或查詢，輸入 exit 離開。", settings.user_name).cyan()
        );
    }

    // surface anything that came due while the bot was not running
    let now = Local::now().naive_local();
    for reminder in due_reminders(&conn, now)? {
        println!("{} {}", "⏰ 提醒:".yellow(), reminder.content);
        advance_reminder(&conn, &reminder)?;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("{} ", ">".bold());
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "exit" || message == "quit" {
            break;
        }
        let reply = handle_message(&conn, message, Local::now().naive_local())?;
        println!("{reply}");
    }
    println!("再見！");
    Ok(())
}
