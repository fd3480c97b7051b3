//! Ties the pieces together: one incoming message becomes one reply,
//! with whatever persistence the intent calls for.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::error::Result;
use crate::fmt;
use crate::models::{
    AccountingPayload, ParseResult, QueryKind, QueryPayload, ReminderPayload, TransactionKind,
};
use crate::parser;
use crate::{db, reports};

/// Handles one chat message end to end. The reply is always produced;
/// errors only surface when the database itself fails.
pub fn handle_message(conn: &Connection, text: &str, now: NaiveDateTime) -> Result<String> {
    match parser::parse_message(text, now) {
        ParseResult::Accounting(payload) => record_transaction(conn, &payload),
        ParseResult::Reminder(payload) => record_reminder(conn, &payload),
        ParseResult::Query(payload) => answer_query(conn, &payload, now),
        ParseResult::AccountCommand(cmd) => add_account(conn, &cmd.account_name),
        ParseResult::Conversation(chat) => Ok(chat.message),
    }
}

fn record_transaction(conn: &Connection, payload: &AccountingPayload) -> Result<String> {
    db::add_transaction(conn, payload)?;
    let label = match payload.kind {
        TransactionKind::Expense => "支出",
        TransactionKind::Income => "收入",
    };
    let mut reply = format!(
        "✅ 已記錄{label}：{} {}\n日期:{}",
        payload.item,
        fmt::amount(payload.amount),
        payload.date.format("%Y-%m-%d"),
    );
    if let Some(category) = &payload.category {
        reply.push_str(&format!("\n分類:{category}"));
    }
    if let Some(account) = &payload.account {
        reply.push_str(&format!("\n帳戶:{account}"));
    }
    Ok(reply)
}

fn record_reminder(conn: &Connection, payload: &ReminderPayload) -> Result<String> {
    db::add_reminder(conn, payload)?;
    let mut reply = format!(
        "⏰ 已設定提醒：{}\n時間:{}\n提前{}分鐘通知",
        payload.content,
        fmt::friendly_datetime(payload.due),
        payload.remind_before,
    );
    if let Some(repeat) = payload.repeat.describe() {
        reply.push_str(&format!("\n{repeat}"));
    }
    Ok(reply)
}

fn add_account(conn: &Connection, name: &str) -> Result<String> {
    if db::find_account(conn, name)?.is_some() {
        return Ok(format!("帳戶「{name}」已存在。"));
    }
    db::find_or_create_account(conn, name)?;
    Ok(format!("✅ 已新增帳戶「{name}」。"))
}

fn answer_query(conn: &Connection, payload: &QueryPayload, now: NaiveDateTime) -> Result<String> {
    match payload.query_type {
        QueryKind::Reminder => list_reminders(conn),
        QueryKind::Balance => list_balances(conn),
        QueryKind::Overview => overview_reply(conn, payload, now),
        QueryKind::Expense => totals_reply(conn, payload, TransactionKind::Expense, now),
        QueryKind::Income => totals_reply(conn, payload, TransactionKind::Income, now),
    }
}

fn list_reminders(conn: &Connection) -> Result<String> {
    let reminders = db::list_reminders(conn, false)?;
    if reminders.is_empty() {
        return Ok("目前沒有未完成的提醒。".to_string());
    }
    let mut reply = format!("📋 未完成的提醒（{}）:", reminders.len());
    for r in &reminders {
        reply.push_str(&format!("\n・{} — {}", fmt::friendly_datetime(r.due), r.content));
        if let Some(repeat) = r.repeat.describe() {
            reply.push_str(&format!("（{repeat}）"));
        }
    }
    Ok(reply)
}

fn list_balances(conn: &Connection) -> Result<String> {
    let accounts = db::list_accounts(conn)?;
    let mut reply = "💰 帳戶餘額:".to_string();
    let mut total = 0.0;
    for account in &accounts {
        total += account.balance;
        reply.push_str(&format!("\n・{}:{}", account.name, fmt::money(account.balance)));
    }
    reply.push_str(&format!("\n合計:{}", fmt::money(total)));
    Ok(reply)
}

fn window_label(payload: &QueryPayload, start: chrono::NaiveDate, end: chrono::NaiveDate) -> String {
    let window = if start == end {
        start.format("%Y-%m-%d").to_string()
    } else {
        format!("{} ~ {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
    };
    let filter = match (&payload.category, &payload.account) {
        (Some(c), Some(a)) => format!("（{c}・{a}）"),
        (Some(c), None) => format!("（{c}）"),
        (None, Some(a)) => format!("（{a}）"),
        (None, None) => String::new(),
    };
    format!("{window}{filter}")
}

fn overview_reply(conn: &Connection, payload: &QueryPayload, now: NaiveDateTime) -> Result<String> {
    let (start, end) = reports::date_bounds(payload.time_range, &payload.time_value, now.date());
    let ov = reports::overview(conn, payload, start, end)?;
    Ok(format!(
        "📊 收支總覽 {}\n收入:{}\n支出:{}\n結餘:{}",
        window_label(payload, start, end),
        fmt::amount(ov.total_income),
        fmt::amount(ov.total_expense),
        fmt::amount(ov.net()),
    ))
}

fn totals_reply(
    conn: &Connection,
    payload: &QueryPayload,
    kind: TransactionKind,
    now: NaiveDateTime,
) -> Result<String> {
    let (start, end) = reports::date_bounds(payload.time_range, &payload.time_value, now.date());
    let total = reports::total_amount(conn, payload, kind, start, end)?;
    let label = match kind {
        TransactionKind::Expense => "支出",
        TransactionKind::Income => "收入",
    };
    if total == 0.0 {
        return Ok(format!("{} 沒有{label}紀錄。", window_label(payload, start, end)));
    }
    let mut reply = format!(
        "📊 {} {label}合計:{}",
        window_label(payload, start, end),
        fmt::amount(total),
    );
    for row in reports::sum_by_category(conn, payload, kind, start, end)? {
        reply.push_str(&format!(
            "\n・{}:{}（{}筆）",
            row.name,
            fmt::amount(row.total),
            row.count
        ));
    }
    Ok(reply)
}
