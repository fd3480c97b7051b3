use chrono::{Datelike, NaiveDateTime};

/// Format an amount with thousands separators: NT$1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-NT${with_commas}.{dec_part}")
    } else {
        format!("NT${with_commas}.{dec_part}")
    }
}

/// Chat-reply amount: whole numbers lose the decimals. 120 → "120元"
pub fn amount(val: f64) -> String {
    if val.fract() == 0.0 {
        format!("{}元", val as i64)
    } else {
        format!("{val:.2}元")
    }
}

/// 2025-04-16 (週三) 15:00
pub fn friendly_datetime(dt: NaiveDateTime) -> String {
    const WEEKDAYS: [&str; 7] = ["週一", "週二", "週三", "週四", "週五", "週六", "週日"];
    let weekday = WEEKDAYS[dt.weekday().num_days_from_monday() as usize];
    format!("{} ({weekday}) {}", dt.format("%Y-%m-%d"), dt.format("%H:%M"))
}
