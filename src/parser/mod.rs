//! Message understanding: classifies a chat message into one intent and
//! extracts its structured payload. Classification is keyword-driven and
//! ordered; the conversation fallback at the end always succeeds.

pub mod accounting;
pub mod datetime;
pub mod query;
pub mod reminder;

use chrono::NaiveDateTime;

use crate::models::{AccountAction, AccountCommandPayload, ConversationPayload, ParseResult};

// ---------------------------------------------------------------------------
// Trigger tables
// ---------------------------------------------------------------------------

pub(crate) const INCOME_KEYWORDS: &[&str] = &[
    "收入", "賺", "得到", "獲得", "贏得", "收款", "進帳", "入帳", "收到", "發薪水", "薪資", "薪水",
];
pub(crate) const EXPENSE_KEYWORDS: &[&str] = &[
    "支出", "花了", "花費", "消費", "支付", "付了", "用了", "買了", "開銷",
];

const ACCOUNT_PREFIXES: &[&str] = &["新增帳戶", "添加帳戶", "加入帳戶"];
/// Explicit bookkeeping verbs that mark an entry even with no amount.
/// Spend/earn words alone are not enough (查詢本月支出 is a query).
const ACCOUNTING_TRIGGERS: &[&str] = &["記帳", "記個帳", "記一筆", "記錄一筆"];
const REMINDER_TRIGGERS: &[&str] = &["提醒我", "提醒", "備忘", "備註"];
const QUERY_TRIGGERS: &[&str] = &[
    "查詢", "報表", "統計", "顯示", "列出", "查看", "查一下", "花了多少", "賺了多少", "花費", "多少",
];

/// Conversational topics surfaced back to the caller as keywords.
const CHAT_TOPICS: &[&str] = &["你好", "嗨", "哈囉", "謝謝", "感謝", "再見", "幫助", "功能", "怎麼用"];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classifies one message. Never fails: text that matches no intent (or a
/// reminder trigger with no usable reminder) becomes a conversation result.
pub fn parse_message(text: &str, now: NaiveDateTime) -> ParseResult {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ParseResult::conversation("請輸入有效的文字。");
    }

    for prefix in ACCOUNT_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            let name = rest.trim().to_string();
            if name.is_empty() {
                return ParseResult::conversation("請提供帳戶名稱，格式：新增帳戶 [帳戶名稱]");
            }
            return ParseResult::AccountCommand(AccountCommandPayload {
                action: AccountAction::AddAccount,
                account_name: name,
            });
        }
    }

    // Reminder first among trigger-bearing intents: "提醒" plus an amount
    // is still a reminder, not a bookkeeping entry.
    if trimmed.starts_with('#') || REMINDER_TRIGGERS.iter().any(|kw| trimmed.contains(kw)) {
        if let Some(payload) = reminder::extract(trimmed, now) {
            return ParseResult::Reminder(payload);
        }
    }

    if looks_like_accounting(trimmed) {
        return ParseResult::Accounting(accounting::extract(trimmed, now.date()));
    }

    if QUERY_TRIGGERS.iter().any(|kw| trimmed.contains(kw)) {
        return ParseResult::Query(query::extract(trimmed));
    }

    ParseResult::Conversation(ConversationPayload {
        message: format!("我不太明白「{trimmed}」的意思，可以記帳、設提醒或查詢喔。"),
        keywords: CHAT_TOPICS
            .iter()
            .filter(|kw| trimmed.contains(*kw))
            .map(|kw| kw.to_string())
            .collect(),
    })
}

/// A message is a bookkeeping entry when it carries a number alongside a
/// spend/earn word or sign, or an explicit bookkeeping verb.
fn looks_like_accounting(text: &str) -> bool {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    if has_digit
        && (EXPENSE_KEYWORDS.iter().any(|kw| text.contains(kw))
            || INCOME_KEYWORDS.iter().any(|kw| text.contains(kw)))
    {
        return true;
    }
    if has_digit && (text.contains('+') || text.contains('-')) {
        return true;
    }
    ACCOUNTING_TRIGGERS.iter().any(|kw| text.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QueryKind, TimeRange, TimeValue, TransactionKind};
    use chrono::{NaiveDate, NaiveTime};

    // 2025-04-15 is a Tuesday
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 15)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_input_is_conversation() {
        match parse_message("   ", now()) {
            ParseResult::Conversation(c) => assert_eq!(c.message, "請輸入有效的文字。"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_signed_amount_is_accounting() {
        match parse_message("午餐 -120", now()) {
            ParseResult::Accounting(a) => {
                assert_eq!(a.item, "午餐");
                assert_eq!(a.amount, 120.0);
                assert_eq!(a.kind, TransactionKind::Expense);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_spend_verb_is_accounting() {
        match parse_message("早餐花了80元", now()) {
            ParseResult::Accounting(a) => {
                assert_eq!(a.amount, 80.0);
                assert_eq!(a.kind, TransactionKind::Expense);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_reminder_trigger() {
        match parse_message("提醒我明天下午3點開會", now()) {
            ParseResult::Reminder(r) => assert_eq!(r.content, "開會"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_hash_prefix_is_reminder() {
        match parse_message("#明天上午9點開會", now()) {
            ParseResult::Reminder(r) => assert_eq!(r.content, "開會"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_reminder_beats_accounting_triggers() {
        // contains a digit and 花了, but the reminder trigger wins
        match parse_message("提醒我明天花了沒的帳要補記 10點", now()) {
            ParseResult::Reminder(_) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_failed_reminder_falls_through_to_query() {
        // reminder trigger but no task content, query trigger present
        match parse_message("查詢提醒", now()) {
            ParseResult::Query(q) => assert_eq!(q.query_type, QueryKind::Reminder),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_query_trigger() {
        match parse_message("查詢本月支出", now()) {
            ParseResult::Query(q) => {
                assert_eq!(q.query_type, QueryKind::Expense);
                assert_eq!(q.time_range, TimeRange::Month);
                assert_eq!(q.time_value, TimeValue::Current);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_account_command() {
        match parse_message("新增帳戶 玉山銀行", now()) {
            ParseResult::AccountCommand(c) => assert_eq!(c.account_name, "玉山銀行"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_account_command_missing_name() {
        match parse_message("新增帳戶", now()) {
            ParseResult::Conversation(c) => assert!(c.message.contains("帳戶名稱")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_plain_chat_is_conversation() {
        match parse_message("你好啊", now()) {
            ParseResult::Conversation(c) => {
                assert!(c.message.contains("你好啊"));
                assert_eq!(c.keywords, vec!["你好".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_bare_number_without_keyword_is_not_accounting() {
        match parse_message("3隻貓", now()) {
            ParseResult::Conversation(_) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
