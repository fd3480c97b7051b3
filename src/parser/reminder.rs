use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDateTime};
use regex::Regex;

use super::datetime::{self, days_in_month, weekday_index};
use crate::models::{ReminderPayload, RepeatRule};

const TRIGGERS: &[&str] = &["提醒", "記得", "別忘了", "記住"];

/// Content patterns, most specific first. "在X提醒我Y" puts the task after
/// the trigger, the plain forms put it right after the trigger word.
static CONTENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:在|於)(.+?)(?:提醒|記得|記住|別忘了?)(?:我|一下)?(.*)$").unwrap(),
        Regex::new(r"提醒(?:我|一下)?(.+)$").unwrap(),
        Regex::new(r"(?:記得|別忘了|記住)(.+)$").unwrap(),
    ]
});

/// One optional date token, one optional day-part, one optional clock. A
/// match counts only when at least one group is non-empty.
static TIME_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(今天|明天|大後天|後天|\d{1,2}月\d{1,2}[日號]|下?[週周][一二三四五六日天]|星期[一二三四五六日天]|下個?月\d{1,2}號?)?\s*(早上|上午|中午|下午|晚上)?\s*(\d{1,2}[點:：]\d{0,2}分?)?",
    )
    .unwrap()
});

static REMIND_BEFORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"提前(\d+)分鐘").unwrap());
static REPEAT_WEEKLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"每[週周]([一二三四五六日天])?").unwrap());
static REPEAT_MONTHLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"每個?月(?:(\d{1,2})號?)?").unwrap());
static STRIP_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"每天|每日|每[週周][一二三四五六日天]?|每個?月(?:\d{1,2}號?)?|提前\d+分鐘")
        .unwrap()
});

/// Default lead time in minutes when 提前N分鐘 is absent.
const DEFAULT_LEAD: u32 = 15;

/// Parses a reminder out of `text`, or `None` when the message carries no
/// reminder trigger or no usable task description. A leading `#` marks the
/// whole message as a reminder even without a trigger word.
pub fn extract(text: &str, now: NaiveDateTime) -> Option<ReminderPayload> {
    let hashed = text.starts_with('#');
    let body = text.trim_start_matches('#').trim();
    if body.is_empty() {
        return None;
    }
    if !hashed && !TRIGGERS.iter().any(|kw| body.contains(kw)) {
        return None;
    }

    let time_fragment = find_time_phrase(body);

    let raw_content = CONTENT_PATTERNS
        .iter()
        .find_map(|re| {
            re.captures(body).map(|caps| {
                // the two-sided pattern prefers the text after the trigger
                let tail = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
                if !tail.is_empty() {
                    tail.to_string()
                } else {
                    caps[1].trim().to_string()
                }
            })
        })
        .or_else(|| hashed.then(|| body.to_string()))?;

    let content = clean_content(&raw_content, time_fragment.as_deref());
    // a leftover bare pronoun means the trigger had no task attached
    if content.is_empty() || content == "我" || content == "一下" {
        return None;
    }

    let remind_before = REMIND_BEFORE
        .captures(body)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(DEFAULT_LEAD);

    let due = datetime::resolve(time_fragment.as_deref().unwrap_or(""), body, now);
    let repeat = extract_repeat(body, due);
    let due = align_to_repeat(due, &repeat, now);

    Some(ReminderPayload {
        content,
        due,
        remind_before,
        repeat,
    })
}

/// First slice of the text that mentions a date, a day part or a clock.
fn find_time_phrase(text: &str) -> Option<String> {
    TIME_PHRASE
        .captures_iter(text)
        .find(|caps| (1..=3).any(|i| caps.get(i).is_some_and(|m| !m.as_str().is_empty())))
        .map(|caps| caps[0].trim().to_string())
}

fn clean_content(raw: &str, time_fragment: Option<&str>) -> String {
    let mut content = raw.to_string();
    if let Some(fragment) = time_fragment {
        if !fragment.is_empty() {
            content = content.replace(fragment, "");
        }
    }
    let content = STRIP_PHRASES.replace_all(&content, "");
    content
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '在' | '於' | '要' | '，' | ','))
        .to_string()
}

fn extract_repeat(text: &str, due: NaiveDateTime) -> RepeatRule {
    if text.contains("每天") || text.contains("每日") {
        return RepeatRule::Daily;
    }
    if let Some(caps) = REPEAT_WEEKLY.captures(text) {
        let day = caps
            .get(1)
            .and_then(|m| weekday_index(m.as_str()))
            .unwrap_or_else(|| due.weekday().num_days_from_monday());
        return RepeatRule::Weekly(day);
    }
    if let Some(caps) = REPEAT_MONTHLY.captures(text) {
        let day = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or_else(|| due.date().day());
        return RepeatRule::Monthly(day);
    }
    RepeatRule::None
}

/// Moves a defaulted due date onto the repeat anchor: a monthly rule lands
/// on the next matching day of month, a weekly rule on the next matching
/// weekday. The time of day is kept as resolved.
fn align_to_repeat(due: NaiveDateTime, repeat: &RepeatRule, now: NaiveDateTime) -> NaiveDateTime {
    match *repeat {
        RepeatRule::Monthly(day) => {
            let mut date = due.date();
            let clamped = day.min(days_in_month(date.year(), date.month()));
            if let Some(candidate) = date.with_day(clamped) {
                date = candidate;
            }
            let mut aligned = NaiveDateTime::new(date, due.time());
            if aligned < now {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                let clamped = day.min(days_in_month(year, month));
                if let Some(next) = chrono::NaiveDate::from_ymd_opt(year, month, clamped) {
                    aligned = NaiveDateTime::new(next, due.time());
                }
            }
            aligned
        }
        RepeatRule::Weekly(weekday) => {
            let current = due.weekday().num_days_from_monday();
            if current == weekday {
                due
            } else {
                let ahead = (7 + weekday - current) % 7;
                due + Duration::days(i64::from(ahead))
            }
        }
        _ => due,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    // 2025-04-15 is a Tuesday
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 15)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn test_basic_reminder() {
        let payload = extract("提醒我明天下午3點開會", now()).unwrap();
        assert_eq!(payload.content, "開會");
        assert_eq!(payload.due, at(2025, 4, 16, 15, 0));
        assert_eq!(payload.remind_before, 15);
        assert_eq!(payload.repeat, RepeatRule::None);
    }

    #[test]
    fn test_hash_prefix_without_trigger() {
        let payload = extract("#明天上午9點開會", now()).unwrap();
        assert_eq!(payload.content, "開會");
        assert_eq!(payload.due, at(2025, 4, 16, 9, 0));
    }

    #[test]
    fn test_no_trigger_returns_none() {
        assert!(extract("明天下午3點開會", now()).is_none());
    }

    #[test]
    fn test_no_time_defaults_tomorrow_morning() {
        let payload = extract("提醒我倒垃圾", now()).unwrap();
        assert_eq!(payload.content, "倒垃圾");
        assert_eq!(payload.due, at(2025, 4, 16, 9, 0));
    }

    #[test]
    fn test_remember_trigger() {
        let payload = extract("記得今天晚上8點吃藥", now()).unwrap();
        assert_eq!(payload.content, "吃藥");
        assert_eq!(payload.due, at(2025, 4, 15, 20, 0));
    }

    #[test]
    fn test_leading_location_form() {
        let payload = extract("在明天下午2點提醒我繳電話費", now()).unwrap();
        assert_eq!(payload.content, "繳電話費");
        assert_eq!(payload.due, at(2025, 4, 16, 14, 0));
    }

    #[test]
    fn test_remind_before_minutes() {
        let payload = extract("提醒我明天10點開會 提前30分鐘", now()).unwrap();
        assert_eq!(payload.remind_before, 30);
        assert_eq!(payload.due, at(2025, 4, 16, 10, 0));
    }

    #[test]
    fn test_daily_repeat() {
        let payload = extract("每天提醒我吃藥", now()).unwrap();
        assert_eq!(payload.repeat, RepeatRule::Daily);
        assert_eq!(payload.content, "吃藥");
    }

    #[test]
    fn test_weekly_repeat_with_day() {
        let payload = extract("每週三提醒我開週會", now()).unwrap();
        assert_eq!(payload.repeat, RepeatRule::Weekly(2));
        // next Wednesday after Tuesday noon
        assert_eq!(payload.due.date(), NaiveDate::from_ymd_opt(2025, 4, 16).unwrap());
        assert_eq!(payload.content, "開週會");
    }

    #[test]
    fn test_monthly_repeat_aligns_due() {
        let payload = extract("每月5號提醒我繳卡費", now()).unwrap();
        assert_eq!(payload.repeat, RepeatRule::Monthly(5));
        assert_eq!(payload.due.date(), NaiveDate::from_ymd_opt(2025, 5, 5).unwrap());
        assert_eq!(payload.content, "繳卡費");
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        let payload = extract("每月31號提醒我對帳", now()).unwrap();
        assert_eq!(payload.repeat, RepeatRule::Monthly(31));
        // April has 30 days
        assert_eq!(payload.due.date(), NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
    }

    #[test]
    fn test_empty_content_returns_none() {
        assert!(extract("提醒我", now()).is_none());
        assert!(extract("#", now()).is_none());
    }

    #[test]
    fn test_past_clock_rolls_to_next_day() {
        let payload = extract("提醒我上午9點運動", now()).unwrap();
        assert_eq!(payload.due, at(2025, 4, 16, 9, 0));
    }
}
