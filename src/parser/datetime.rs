use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

// ---------------------------------------------------------------------------
// Keyword tables
// ---------------------------------------------------------------------------

/// Day-offset keywords, longest first so 大後天 is not eaten by 後天.
const DAY_OFFSETS: &[(&str, i64)] = &[("大後天", 3), ("後天", 2), ("明天", 1), ("今天", 0)];

/// Default hour for each time-of-day bucket.
const TIME_BUCKETS: &[(&str, u32)] = &[
    ("早上", 8),
    ("上午", 10),
    ("中午", 12),
    ("下午", 15),
    ("晚上", 20),
];

static EXPLICIT_MD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})月(\d{1,2})[日號]").unwrap());
static WEEKDAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:下週|下周|週|周|星期)([一二三四五六日天])").unwrap());
static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[點:：](\d{1,2})?").unwrap());
static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})年(\d{1,2})(?:月|/|-)(\d{1,2})[日號]?").unwrap());
static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})(?:月|/|-)(\d{1,2})[日號]?").unwrap());
static PREFIXED_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(上個?|這個?|下個?)?(?:星期|週|周)([一二三四五六日天])").unwrap()
});

/// Map 一…日/天 to Monday=0 … Sunday=6.
pub fn weekday_index(ch: &str) -> Option<u32> {
    match ch {
        "一" => Some(0),
        "二" => Some(1),
        "三" => Some(2),
        "四" => Some(3),
        "五" => Some(4),
        "六" => Some(5),
        "日" | "天" => Some(6),
        _ => None,
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(first) => (first - Duration::days(1)).day(),
        None => 30,
    }
}

fn day_offset(text: &str) -> Option<i64> {
    DAY_OFFSETS
        .iter()
        .find(|(kw, _)| text.contains(kw))
        .map(|(_, off)| *off)
}

fn bucket_hour(text: &str) -> Option<u32> {
    TIME_BUCKETS
        .iter()
        .find(|(kw, _)| text.contains(kw))
        .map(|(_, h)| *h)
}

/// Explicit M月D日, rolled to next year when already past. Invalid
/// day-of-month values are clamped to the end of that month.
fn month_day_with_rollover(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) || day == 0 {
        return None;
    }
    let mut year = today.year();
    if month < today.month() || (month == today.month() && day < today.day()) {
        year += 1;
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)))
}

// ---------------------------------------------------------------------------
// Date extraction for accounting entries
// ---------------------------------------------------------------------------

/// Parse an explicit `@date` token: 今天/昨天/前天, `M/D`, `Y/M/D`, `M-D`,
/// `Y-M-D`. Returns None when the token is not a recognizable date.
pub fn parse_date_token(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    match token {
        "今天" => return Some(today),
        "昨天" => return Some(today - Duration::days(1)),
        "前天" => return Some(today - Duration::days(2)),
        _ => {}
    }
    let sep = if token.contains('/') {
        '/'
    } else if token.contains('-') {
        '-'
    } else {
        return None;
    };
    let parts: Vec<&str> = token.split(sep).collect();
    let (year, month, day) = match parts.as_slice() {
        [m, d] => (today.year(), m.parse().ok()?, d.parse().ok()?),
        [y, m, d] => (y.parse().ok()?, m.parse().ok()?, d.parse().ok()?),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Weekday arithmetic with an optional 上/這/下 week prefix. Unlike the
/// reminder resolver this may land in the past (上週五 is a real entry date).
fn weekday_in_week(prefix: Option<&str>, target: u32, today: NaiveDate) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let mut delta = target as i64 - current;
    match prefix {
        Some("上") | Some("上個") => delta -= 7,
        Some("下") | Some("下個") => delta += 7,
        _ => {}
    }
    today + Duration::days(delta)
}

/// Scan free text for an embedded date phrase. Checked most specific first:
/// relative day keywords, full Y年M月D日, M月D日, then weekday expressions.
/// None when the text carries no date signal.
pub fn find_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if text.contains("今天") {
        return Some(today);
    }
    if text.contains("昨天") {
        return Some(today - Duration::days(1));
    }
    if text.contains("前天") {
        return Some(today - Duration::days(2));
    }
    if let Some(caps) = FULL_DATE.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Some(caps) = MONTH_DAY.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(today.year(), month, day) {
            return Some(date);
        }
    }
    if let Some(caps) = PREFIXED_WEEKDAY.captures(text) {
        let prefix = caps.get(1).map(|m| m.as_str());
        let target = weekday_index(&caps[2])?;
        return Some(weekday_in_week(prefix, target, today));
    }
    None
}

// ---------------------------------------------------------------------------
// Reminder due-time resolution
// ---------------------------------------------------------------------------

/// Resolve a reminder's due time from the located time fragment plus the
/// full message, relative to `now`. Pure function of its inputs.
///
/// Precedence when several date signals are present: explicit M月D日 wins
/// over a weekday phrase, which wins over a day-offset keyword. Time-wise an
/// explicit H:MM / H點 beats the time-of-day bucket. With no signals at all
/// the due time defaults to tomorrow 09:00; a date without a time gets
/// 09:00; a time already past today rolls forward one day.
pub fn resolve(fragment: &str, full_text: &str, now: NaiveDateTime) -> NaiveDateTime {
    let fragment = fragment.trim();
    let tomorrow_morning = || {
        (now.date() + Duration::days(1))
            .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default())
    };

    let captures = |re: &LazyLock<Regex>| {
        re.captures(fragment).or_else(|| re.captures(full_text))
    };

    let date = if let Some(caps) = captures(&EXPLICIT_MD) {
        let month = caps[1].parse().unwrap_or(0);
        let day = caps[2].parse().unwrap_or(0);
        month_day_with_rollover(month, day, now.date())
    } else {
        None
    };
    let date = date.or_else(|| {
        captures(&WEEKDAY).and_then(|caps| {
            let target = weekday_index(&caps[1])? as i64;
            let current = now.date().weekday().num_days_from_monday() as i64;
            let next_week = fragment.contains("下週")
                || fragment.contains("下周")
                || full_text.contains("下週")
                || full_text.contains("下周");
            let days_ahead = if next_week {
                7 - current + target
            } else if target > current {
                target - current
            } else {
                7 + target - current
            };
            Some(now.date() + Duration::days(days_ahead))
        })
    });
    let date = date.or_else(|| {
        day_offset(fragment)
            .or_else(|| day_offset(full_text))
            .map(|off| now.date() + Duration::days(off))
    });

    let afternoon = ["下午", "晚上"]
        .iter()
        .any(|kw| fragment.contains(kw) || full_text.contains(kw));
    let time = if let Some(caps) = captures(&CLOCK) {
        let mut hour: u32 = caps[1].parse().unwrap_or(9);
        let minute: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        if afternoon && hour < 12 {
            hour += 12;
        }
        NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0)
    } else {
        bucket_hour(fragment)
            .or_else(|| bucket_hour(full_text))
            .and_then(|h| NaiveTime::from_hms_opt(h, 0, 0))
    };

    let mut due = match (date, time) {
        (None, None) => return tomorrow_morning(),
        (Some(d), None) => d.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()),
        (None, Some(t)) => now.date().and_time(t),
        (Some(d), Some(t)) => d.and_time(t),
    };
    if due < now && due.date() == now.date() {
        due += Duration::days(1);
    }
    due
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-04-15 is a Tuesday.
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn today() -> NaiveDate {
        now().date()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_token_relative() {
        assert_eq!(parse_date_token("今天", today()), Some(date(2025, 4, 15)));
        assert_eq!(parse_date_token("昨天", today()), Some(date(2025, 4, 14)));
        assert_eq!(parse_date_token("前天", today()), Some(date(2025, 4, 13)));
    }

    #[test]
    fn test_parse_date_token_numeric() {
        assert_eq!(parse_date_token("4/1", today()), Some(date(2025, 4, 1)));
        assert_eq!(parse_date_token("2023/4/1", today()), Some(date(2023, 4, 1)));
        assert_eq!(parse_date_token("4-1", today()), Some(date(2025, 4, 1)));
        assert_eq!(parse_date_token("2023-12-31", today()), Some(date(2023, 12, 31)));
        assert_eq!(parse_date_token("不是日期", today()), None);
        assert_eq!(parse_date_token("13/45", today()), None);
    }

    #[test]
    fn test_find_date_relative_keywords() {
        assert_eq!(find_date("昨天買的咖啡", today()), Some(date(2025, 4, 14)));
        assert_eq!(find_date("今天午餐", today()), Some(date(2025, 4, 15)));
    }

    #[test]
    fn test_find_date_explicit() {
        assert_eq!(find_date("4月1日的房租", today()), Some(date(2025, 4, 1)));
        assert_eq!(
            find_date("2023年4月1日的帳", today()),
            Some(date(2023, 4, 1))
        );
        assert_eq!(find_date("沒有日期", today()), None);
    }

    #[test]
    fn test_find_date_weekday() {
        // today is Tuesday (index 1)
        assert_eq!(find_date("上週五的聚餐", today()), Some(date(2025, 4, 11)));
        assert_eq!(find_date("下週三繳費", today()), Some(date(2025, 4, 23)));
        assert_eq!(find_date("這週一的車票", today()), Some(date(2025, 4, 14)));
    }

    #[test]
    fn test_find_date_weekday_prefix_holds_across_week() {
        // 下/上 shift a full week even when the target weekday has not
        // passed yet: from Tuesday, 下週五 is next week's Friday, not
        // this week's
        assert_eq!(find_date("下週五請款", today()), Some(date(2025, 4, 25)));
        assert_eq!(find_date("上週二的油錢", today()), Some(date(2025, 4, 8)));
    }

    #[test]
    fn test_resolve_defaults_to_tomorrow_morning() {
        let due = resolve("", "提醒我倒垃圾", now());
        assert_eq!(due, date(2025, 4, 16).and_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_tomorrow_with_clock() {
        let due = resolve("明天上午9點", "提醒我明天上午9點開會", now());
        assert_eq!(due, date(2025, 4, 16).and_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_pm_adjustment() {
        let due = resolve("下午3點", "下午3點提醒我繳稅", now());
        assert_eq!(due, date(2025, 4, 15).and_hms_opt(15, 0, 0).unwrap());
        let due = resolve("晚上8點", "晚上8點提醒我吃藥", now());
        assert_eq!(due, date(2025, 4, 15).and_hms_opt(20, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_bucket_without_clock() {
        let due = resolve("明天早上", "提醒我明天早上運動", now());
        assert_eq!(due, date(2025, 4, 16).and_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_past_time_today_rolls_forward() {
        // 08:00 has already passed at the reference noon
        let due = resolve("早上8點", "提醒我早上8點吃藥", now());
        assert_eq!(due, date(2025, 4, 16).and_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_explicit_date_beats_weekday_and_offset() {
        let due = resolve("明天5月1日下午3點", "5月1日下午3點提醒繳稅 明天", now());
        assert_eq!(due, date(2025, 5, 1).and_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_weekday_next_week() {
        // Tuesday + (7 - 1 + 2) = next Wednesday
        let due = resolve("下週三早上", "下週三早上提醒我開會", now());
        assert_eq!(due, date(2025, 4, 23).and_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_weekday_this_week_is_future_biased() {
        let due = resolve("週五", "週五提醒我交報告", now());
        assert_eq!(due.date(), date(2025, 4, 18));
        // Monday already passed, so 週一 means next Monday
        let due = resolve("週一", "週一提醒我收衣服", now());
        assert_eq!(due.date(), date(2025, 4, 21));
    }

    #[test]
    fn test_resolve_month_day_rollover_to_next_year() {
        let due = resolve("1月1日", "1月1日提醒我拜年", now());
        assert_eq!(due.date(), date(2026, 1, 1));
    }

    #[test]
    fn test_resolve_invalid_day_clamps_to_month_end() {
        let due = resolve("2月30日", "2月30日提醒我", now());
        assert_eq!(due.date(), date(2026, 2, 28));
    }

    #[test]
    fn test_resolve_day_offsets() {
        assert_eq!(
            resolve("大後天", "大後天提醒我拿包裹", now()).date(),
            date(2025, 4, 18)
        );
        assert_eq!(
            resolve("後天", "後天提醒我拿包裹", now()).date(),
            date(2025, 4, 17)
        );
    }

    #[test]
    fn test_resolve_date_and_time_independent() {
        // round-trip property: explicit date and explicit time both survive
        let due = resolve("5月20日14:30", "5月20日14:30提醒我面試", now());
        assert_eq!(due.date(), date(2025, 5, 20));
        assert_eq!(due.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 12), 31);
        assert_eq!(days_in_month(2025, 4), 30);
    }
}
