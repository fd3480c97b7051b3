use chrono::Local;
use colored::Colorize;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::handler::handle_message;
use crate::settings::db_path;

/// Sample messages fed through the full pipeline, one per line of a
/// plausible day of use.
const DEMO_MESSAGES: &[&str] = &[
    "早餐花了65元",
    "午餐 -120",
    "搭捷運花了30元",
    "買了衣服1200元 <信用卡>",
    "薪水 +50000",
    "新增帳戶 玉山銀行",
    "提醒我明天下午3點開會",
    "每月5號提醒我繳卡費 提前30分鐘",
    "#週五晚上7點聚餐",
    "查詢本月支出",
    "餘額多少",
    "查詢提醒",
];

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    init_db(&conn)?;

    let now = Local::now().naive_local();
    for message in DEMO_MESSAGES {
        println!("{} {}", ">".bold(), message.cyan());
        let reply = handle_message(&conn, message, now)?;
        println!("{reply}\n");
    }
    println!("{}", "示範結束 — 執行 `zhangfang chat` 繼續。".green());
    Ok(())
}
