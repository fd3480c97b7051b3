use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;

use crate::db::DATE_FMT;
use crate::error::Result;
use crate::models::{QueryPayload, TimeRange, TimeValue, TransactionKind};
use crate::parser::datetime::days_in_month;

// ---------------------------------------------------------------------------
// Date bounds
// ---------------------------------------------------------------------------

fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default());
    let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).unwrap_or(start);
    (start, end)
}

/// Inclusive date bounds for a query. Weeks start on Monday. An explicit
/// value that does not parse falls back to the current instance.
pub fn date_bounds(
    range: TimeRange,
    value: &TimeValue,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    match range {
        TimeRange::Day => {
            let day = match value {
                TimeValue::Current => today,
                TimeValue::Previous => today - Duration::days(1),
                TimeValue::Explicit(s) => NaiveDate::parse_from_str(s, DATE_FMT).unwrap_or(today),
            };
            (day, day)
        }
        TimeRange::Week => {
            let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            let monday = match value {
                TimeValue::Previous => monday - Duration::days(7),
                _ => monday,
            };
            (monday, monday + Duration::days(6))
        }
        TimeRange::Month => match value {
            TimeValue::Current => month_bounds(today.year(), today.month()),
            TimeValue::Previous => {
                let (year, month) = if today.month() == 1 {
                    (today.year() - 1, 12)
                } else {
                    (today.year(), today.month() - 1)
                };
                month_bounds(year, month)
            }
            TimeValue::Explicit(s) => {
                let parsed = s.split_once('-').and_then(|(y, m)| {
                    Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?))
                });
                match parsed {
                    Some((year, month @ 1..=12)) => month_bounds(year, month),
                    _ => month_bounds(today.year(), today.month()),
                }
            }
        },
        TimeRange::Year => {
            let year = match value {
                TimeValue::Current => today.year(),
                TimeValue::Previous => today.year() - 1,
                TimeValue::Explicit(s) => s
                    .split('-')
                    .next()
                    .and_then(|y| y.parse().ok())
                    .unwrap_or_else(|| today.year()),
            };
            (
                NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today),
                NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
    pub count: i64,
}

pub struct Overview {
    pub total_income: f64,
    pub total_expense: f64,
}

impl Overview {
    pub fn net(&self) -> f64 {
        self.total_income - self.total_expense
    }
}

fn filter_clause(payload: &QueryPayload) -> (String, Vec<String>) {
    let mut clause = "t.date BETWEEN ?1 AND ?2".to_string();
    let mut params = Vec::new();
    if let Some(category) = &payload.category {
        params.push(category.clone());
        clause.push_str(&format!(" AND c.name = ?{}", params.len() + 2));
    }
    if let Some(account) = &payload.account {
        params.push(account.clone());
        clause.push_str(&format!(" AND a.name = ?{}", params.len() + 2));
    }
    (clause, params)
}

fn bind<'a>(
    start: &'a String,
    end: &'a String,
    extra: &'a [String],
) -> Vec<&'a dyn rusqlite::types::ToSql> {
    let mut values: Vec<&dyn rusqlite::types::ToSql> = vec![start, end];
    for p in extra {
        values.push(p);
    }
    values
}

/// Per-category totals for one transaction type inside the query's window,
/// largest first.
pub fn sum_by_category(
    conn: &Connection,
    payload: &QueryPayload,
    kind: TransactionKind,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CategoryTotal>> {
    let (clause, extra) = filter_clause(payload);
    let sql = format!(
        "SELECT COALESCE(c.name, '未分類'), SUM(t.amount), COUNT(*) \
         FROM transactions t \
         LEFT JOIN categories c ON t.category_id = c.id \
         JOIN accounts a ON t.account_id = a.id \
         WHERE {clause} AND t.transaction_type = '{}' \
         GROUP BY c.name ORDER BY SUM(t.amount) DESC",
        kind.as_str()
    );
    let start = start.format(DATE_FMT).to_string();
    let end = end.format(DATE_FMT).to_string();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(bind(&start, &end, &extra).as_slice(), |row| {
        Ok(CategoryTotal {
            name: row.get(0)?,
            total: row.get(1)?,
            count: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn total_amount(
    conn: &Connection,
    payload: &QueryPayload,
    kind: TransactionKind,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<f64> {
    let (clause, extra) = filter_clause(payload);
    let sql = format!(
        "SELECT COALESCE(SUM(t.amount), 0) \
         FROM transactions t \
         LEFT JOIN categories c ON t.category_id = c.id \
         JOIN accounts a ON t.account_id = a.id \
         WHERE {clause} AND t.transaction_type = '{}'",
        kind.as_str()
    );
    let start = start.format(DATE_FMT).to_string();
    let end = end.format(DATE_FMT).to_string();
    let total = conn.query_row(&sql, bind(&start, &end, &extra).as_slice(), |row| row.get(0))?;
    Ok(total)
}

pub fn overview(
    conn: &Connection,
    payload: &QueryPayload,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Overview> {
    Ok(Overview {
        total_income: total_amount(conn, payload, TransactionKind::Income, start, end)?,
        total_expense: total_amount(conn, payload, TransactionKind::Expense, start, end)?,
    })
}

// ---------------------------------------------------------------------------
// Transaction listing (for report tables)
// ---------------------------------------------------------------------------

pub struct TransactionRow {
    pub date: String,
    pub item: String,
    pub category: Option<String>,
    pub account: String,
    pub amount: f64,
    pub kind: TransactionKind,
}

pub fn list_transactions(
    conn: &Connection,
    kind: TransactionKind,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<TransactionRow>> {
    let mut stmt = conn.prepare(
        "SELECT t.date, t.item, c.name, a.name, t.amount, t.transaction_type \
         FROM transactions t \
         LEFT JOIN categories c ON t.category_id = c.id \
         JOIN accounts a ON t.account_id = a.id \
         WHERE t.date BETWEEN ?1 AND ?2 AND t.transaction_type = ?3 \
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt.query_map(
        rusqlite::params![
            start.format(DATE_FMT).to_string(),
            end.format(DATE_FMT).to_string(),
            kind.as_str(),
        ],
        |row| {
            let kind_text: String = row.get(5)?;
            Ok(TransactionRow {
                date: row.get(0)?,
                item: row.get(1)?,
                category: row.get(2)?,
                account: row.get(3)?,
                amount: row.get(4)?,
                kind: TransactionKind::from_str(&kind_text).unwrap_or(TransactionKind::Expense),
            })
        },
    )?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}
