use chrono::Local;

use crate::error::Result;
use crate::models::ParseResult;
use crate::parser::parse_message;

/// Dry-run parse of one message. JSON mode prints the structured payload;
/// plain mode prints a one-line summary of what would happen.
pub fn run(text: &str, json: bool) -> Result<()> {
    let result = parse_message(text, Local::now().naive_local());
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    match &result {
        ParseResult::Accounting(a) => println!(
            "記帳:{} {} {}（分類:{}／帳戶:{}／日期:{}）",
            a.kind.as_str(),
            a.item,
            a.amount,
            a.category.as_deref().unwrap_or("—"),
            a.account.as_deref().unwrap_or("預設"),
            a.date,
        ),
        ParseResult::Reminder(r) => println!(
            "提醒:{}（{}，提前{}分鐘）",
            r.content, r.due, r.remind_before
        ),
        ParseResult::Query(q) => println!(
            "查詢:{:?} {:?}",
            q.query_type, q.time_range
        ),
        ParseResult::AccountCommand(c) => println!("帳戶指令:新增「{}」", c.account_name),
        ParseResult::Conversation(c) => println!("對話:{}", c.message),
    }
    Ok(())
}
