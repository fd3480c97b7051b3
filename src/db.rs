use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{Account, AccountingPayload, Reminder, ReminderPayload, RepeatRule, TransactionKind};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    balance REAL NOT NULL DEFAULT 0,
    is_default INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    category_type TEXT NOT NULL,
    UNIQUE (name, category_type)
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL,
    category_id INTEGER,
    item TEXT NOT NULL,
    amount REAL NOT NULL,
    transaction_type TEXT NOT NULL,
    date TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS reminders (
    id INTEGER PRIMARY KEY,
    content TEXT NOT NULL,
    due_at TEXT NOT NULL,
    remind_before INTEGER NOT NULL DEFAULT 15,
    repeat_type TEXT NOT NULL DEFAULT 'none',
    repeat_value INTEGER,
    is_done INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);
";

// (name, category_type)
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("飲食", "expense"),
    ("交通", "expense"),
    ("購物", "expense"),
    ("娛樂", "expense"),
    ("醫療", "expense"),
    ("教育", "expense"),
    ("居家", "expense"),
    ("其他", "expense"),
    ("薪資", "income"),
    ("獎金", "income"),
    ("投資", "income"),
    ("退款", "income"),
    ("其他", "income"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, kind) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, category_type) VALUES (?1, ?2)",
                rusqlite::params![name, kind],
            )?;
        }
    }

    let accounts: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |row| row.get(0))?;
    if accounts == 0 {
        conn.execute(
            "INSERT INTO accounts (name, is_default) VALUES ('現金', 1)",
            [],
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub fn find_account(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row("SELECT id FROM accounts WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    Ok(id)
}

/// Creates the account if missing; the default account never moves.
pub fn find_or_create_account(conn: &Connection, name: &str) -> Result<i64> {
    if let Some(id) = find_account(conn, name)? {
        return Ok(id);
    }
    conn.execute("INSERT INTO accounts (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

pub fn default_account_id(conn: &Connection) -> Result<i64> {
    let id = conn.query_row(
        "SELECT id FROM accounts WHERE is_default = 1 ORDER BY id LIMIT 1",
        [],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt =
        conn.prepare("SELECT id, name, balance, is_default FROM accounts ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Account {
            id: row.get(0)?,
            name: row.get(1)?,
            balance: row.get(2)?,
            is_default: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub fn find_or_create_category(
    conn: &Connection,
    name: &str,
    kind: TransactionKind,
) -> Result<i64> {
    let existing = conn
        .query_row(
            "SELECT id FROM categories WHERE name = ?1 AND category_type = ?2",
            rusqlite::params![name, kind.as_str()],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO categories (name, category_type) VALUES (?1, ?2)",
        rusqlite::params![name, kind.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Inserts a bookkeeping entry and moves the account balance with it.
/// An unnamed account falls back to the default one, an uncategorized
/// entry lands in 其他.
pub fn add_transaction(conn: &Connection, payload: &AccountingPayload) -> Result<i64> {
    let account_id = match &payload.account {
        Some(name) => find_or_create_account(conn, name)?,
        None => default_account_id(conn)?,
    };
    let category_id = match &payload.category {
        Some(name) => find_or_create_category(conn, name, payload.kind)?,
        None => find_or_create_category(conn, "其他", payload.kind)?,
    };

    conn.execute(
        "INSERT INTO transactions (account_id, category_id, item, amount, transaction_type, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            account_id,
            category_id,
            payload.item,
            payload.amount,
            payload.kind.as_str(),
            payload.date.format(DATE_FMT).to_string(),
        ],
    )?;
    let id = conn.last_insert_rowid();

    let delta = match payload.kind {
        TransactionKind::Income => payload.amount,
        TransactionKind::Expense => -payload.amount,
    };
    conn.execute(
        "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
        rusqlite::params![delta, account_id],
    )?;
    Ok(id)
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

pub fn add_reminder(conn: &Connection, payload: &ReminderPayload) -> Result<i64> {
    let (repeat_type, repeat_value) = payload.repeat.as_db();
    conn.execute(
        "INSERT INTO reminders (content, due_at, remind_before, repeat_type, repeat_value)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            payload.content,
            payload.due.format(DATETIME_FMT).to_string(),
            payload.remind_before,
            repeat_type,
            repeat_value,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn reminder_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
    let due_text: String = row.get(2)?;
    let due = NaiveDateTime::parse_from_str(&due_text, DATETIME_FMT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let repeat_type: String = row.get(4)?;
    let repeat_value: Option<i64> = row.get(5)?;
    Ok(Reminder {
        id: row.get(0)?,
        content: row.get(1)?,
        due,
        remind_before: row.get(3)?,
        repeat: RepeatRule::from_db(&repeat_type, repeat_value),
        is_done: row.get(6)?,
    })
}

pub fn list_reminders(conn: &Connection, include_done: bool) -> Result<Vec<Reminder>> {
    let sql = if include_done {
        "SELECT id, content, due_at, remind_before, repeat_type, repeat_value, is_done
         FROM reminders ORDER BY due_at"
    } else {
        "SELECT id, content, due_at, remind_before, repeat_type, repeat_value, is_done
         FROM reminders WHERE is_done = 0 ORDER BY due_at"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], reminder_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn mark_reminder_done(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("UPDATE reminders SET is_done = 1 WHERE id = ?1", [id])?;
    Ok(())
}

pub fn reschedule_reminder(conn: &Connection, id: i64, due: NaiveDateTime) -> Result<()> {
    conn.execute(
        "UPDATE reminders SET due_at = ?1 WHERE id = ?2",
        rusqlite::params![due.format(DATETIME_FMT).to_string(), id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn expense(item: &str, amount: f64) -> AccountingPayload {
        AccountingPayload {
            item: item.to_string(),
            amount,
            kind: TransactionKind::Expense,
            category: Some("飲食".to_string()),
            account: None,
            date: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
        }
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["accounts", "categories", "transactions", "reminders"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let accounts = list_accounts(&conn).unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_seeds_default_account_and_categories() {
        let (_dir, conn) = test_db();
        let accounts = list_accounts(&conn).unwrap();
        assert_eq!(accounts[0].name, "現金");
        assert!(accounts[0].is_default);
        let count: i64 = conn
            .query_row("SELECT count(*) FROM categories", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, DEFAULT_CATEGORIES.len() as i64);
    }

    #[test]
    fn test_find_or_create_account_reuses_existing() {
        let (_dir, conn) = test_db();
        let a = find_or_create_account(&conn, "玉山銀行").unwrap();
        let b = find_or_create_account(&conn, "玉山銀行").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_add_transaction_moves_balance() {
        let (_dir, conn) = test_db();
        add_transaction(&conn, &expense("午餐", 120.0)).unwrap();
        let mut income = expense("薪水", 50000.0);
        income.kind = TransactionKind::Income;
        income.category = Some("薪資".to_string());
        add_transaction(&conn, &income).unwrap();

        let balance: f64 = conn
            .query_row("SELECT balance FROM accounts WHERE is_default = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(balance, 50000.0 - 120.0);
    }

    #[test]
    fn test_transaction_with_named_account() {
        let (_dir, conn) = test_db();
        let mut payload = expense("電影票", 300.0);
        payload.account = Some("信用卡".to_string());
        add_transaction(&conn, &payload).unwrap();
        let balance: f64 = conn
            .query_row("SELECT balance FROM accounts WHERE name = '信用卡'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(balance, -300.0);
    }

    #[test]
    fn test_reminder_roundtrip() {
        let (_dir, conn) = test_db();
        let payload = ReminderPayload {
            content: "開會".to_string(),
            due: NaiveDate::from_ymd_opt(2025, 4, 16)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(15, 0, 0).unwrap()),
            remind_before: 30,
            repeat: RepeatRule::Weekly(2),
        };
        let id = add_reminder(&conn, &payload).unwrap();
        let reminders = list_reminders(&conn, false).unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].id, id);
        assert_eq!(reminders[0].content, "開會");
        assert_eq!(reminders[0].due, payload.due);
        assert_eq!(reminders[0].remind_before, 30);
        assert_eq!(reminders[0].repeat, RepeatRule::Weekly(2));
        assert!(!reminders[0].is_done);
    }

    #[test]
    fn test_done_reminders_are_hidden() {
        let (_dir, conn) = test_db();
        let payload = ReminderPayload {
            content: "倒垃圾".to_string(),
            due: NaiveDate::from_ymd_opt(2025, 4, 16)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            remind_before: 15,
            repeat: RepeatRule::None,
        };
        let id = add_reminder(&conn, &payload).unwrap();
        mark_reminder_done(&conn, id).unwrap();
        assert!(list_reminders(&conn, false).unwrap().is_empty());
        assert_eq!(list_reminders(&conn, true).unwrap().len(), 1);
    }
}
