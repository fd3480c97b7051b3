use std::sync::LazyLock;

use regex::Regex;

use super::accounting::{normalize_account, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
use crate::models::{QueryKind, QueryPayload, TimeRange, TimeValue};

// ---------------------------------------------------------------------------
// Keyword tables
// ---------------------------------------------------------------------------

/// Query kind keywords, tested top to bottom. Anything that matches none of
/// them is an expense query.
const KIND_KEYWORDS: &[(QueryKind, &[&str])] = &[
    (QueryKind::Reminder, &["提醒", "待辦", "代辦", "行程", "活動"]),
    (QueryKind::Balance, &["餘額", "結餘", "剩餘", "帳戶"]),
    (QueryKind::Overview, &["總覽", "概況", "彙總", "匯總", "所有"]),
    (QueryKind::Income, &["收入", "賺了", "賺", "獲得", "收到"]),
];

/// Relative time expressions, tested top to bottom.
const TIME_KEYWORDS: &[(TimeRange, TimeValue, &[&str])] = &[
    (TimeRange::Day, TimeValue::Current, &["今天", "本日", "當日", "今日"]),
    (TimeRange::Day, TimeValue::Previous, &["昨天", "昨日", "前一天"]),
    (TimeRange::Week, TimeValue::Previous, &["上週", "上周", "上個星期", "上星期"]),
    (TimeRange::Week, TimeValue::Current, &["本週", "本周", "這週", "這周", "這個星期", "這星期"]),
    (TimeRange::Month, TimeValue::Previous, &["上個月", "上月"]),
    (TimeRange::Month, TimeValue::Current, &["本月", "這個月", "當月"]),
    (TimeRange::Year, TimeValue::Previous, &["去年", "上年度"]),
    (TimeRange::Year, TimeValue::Current, &["今年", "本年度"]),
];

static EXPLICIT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[/\-年](\d{1,2})(?:[/\-月](\d{1,2})[日號]?)?").unwrap()
});

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Turns a query message into a structured query. Unknown or missing parts
/// default to "this month's expenses with no filter".
pub fn extract(text: &str) -> QueryPayload {
    let query_type = KIND_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(kind, _)| *kind)
        .unwrap_or(QueryKind::Expense);

    let (time_range, time_value) = extract_time(text);
    let category = extract_category(text);
    let account = normalize_account(text);

    QueryPayload {
        query_type,
        time_range,
        time_value,
        category,
        account,
    }
}

fn extract_time(text: &str) -> (TimeRange, TimeValue) {
    if let Some(caps) = EXPLICIT_DATE.captures(text) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(1);
        if let Some(day) = caps.get(3) {
            let day: u32 = day.as_str().parse().unwrap_or(1);
            return (
                TimeRange::Day,
                TimeValue::Explicit(format!("{year:04}-{month:02}-{day:02}")),
            );
        }
        return (
            TimeRange::Month,
            TimeValue::Explicit(format!("{year:04}-{month:02}")),
        );
    }
    for (range, value, keywords) in TIME_KEYWORDS {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return (*range, value.clone());
        }
    }
    (TimeRange::Month, TimeValue::Current)
}

/// Category filter: the category's own name counts as a keyword, so that
/// "交通費" hits 交通 even though the trigger list is spending-phrased.
fn extract_category(text: &str) -> Option<String> {
    EXPENSE_CATEGORIES
        .iter()
        .chain(INCOME_CATEGORIES.iter())
        .find(|(name, keywords)| {
            text.contains(name) || keywords.iter().any(|kw| text.contains(kw))
        })
        .map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expense_this_month() {
        let q = extract("查詢");
        assert_eq!(q.query_type, QueryKind::Expense);
        assert_eq!(q.time_range, TimeRange::Month);
        assert_eq!(q.time_value, TimeValue::Current);
        assert!(q.category.is_none());
        assert!(q.account.is_none());
    }

    #[test]
    fn test_income_last_week() {
        let q = extract("上週收入多少");
        assert_eq!(q.query_type, QueryKind::Income);
        assert_eq!(q.time_range, TimeRange::Week);
        assert_eq!(q.time_value, TimeValue::Previous);
    }

    #[test]
    fn test_reminder_wins_over_other_kinds() {
        let q = extract("顯示所有提醒");
        assert_eq!(q.query_type, QueryKind::Reminder);
    }

    #[test]
    fn test_balance_query() {
        let q = extract("現在餘額多少");
        assert_eq!(q.query_type, QueryKind::Balance);
    }

    #[test]
    fn test_overview_query() {
        let q = extract("本月總覽");
        assert_eq!(q.query_type, QueryKind::Overview);
        assert_eq!(q.time_range, TimeRange::Month);
        assert_eq!(q.time_value, TimeValue::Current);
    }

    #[test]
    fn test_explicit_month() {
        let q = extract("2025年3月支出");
        assert_eq!(q.time_range, TimeRange::Month);
        assert_eq!(q.time_value, TimeValue::Explicit("2025-03".into()));
    }

    #[test]
    fn test_explicit_day() {
        let q = extract("2025/3/8花了多少");
        assert_eq!(q.time_range, TimeRange::Day);
        assert_eq!(q.time_value, TimeValue::Explicit("2025-03-08".into()));
    }

    #[test]
    fn test_category_filter_by_name() {
        let q = extract("查詢上個月交通費");
        assert_eq!(q.category.as_deref(), Some("交通"));
        assert_eq!(q.time_range, TimeRange::Month);
        assert_eq!(q.time_value, TimeValue::Previous);
    }

    #[test]
    fn test_account_filter() {
        let q = extract("信用卡這個月花了多少");
        assert_eq!(q.account.as_deref(), Some("信用卡"));
        assert_eq!(q.time_range, TimeRange::Month);
        assert_eq!(q.time_value, TimeValue::Current);
    }

    #[test]
    fn test_yearly_query() {
        let q = extract("今年收入統計");
        assert_eq!(q.query_type, QueryKind::Income);
        assert_eq!(q.time_range, TimeRange::Year);
        assert_eq!(q.time_value, TimeValue::Current);
    }
}
