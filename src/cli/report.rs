use chrono::Local;
use comfy_table::{Cell, CellAlignment, Table};

use crate::db::{self, get_connection};
use crate::error::Result;
use crate::fmt;
use crate::models::{QueryKind, TransactionKind};
use crate::reports;
use crate::settings::db_path;

use super::month_query;

pub fn expense(month: Option<String>) -> Result<()> {
    by_category(TransactionKind::Expense, QueryKind::Expense, month)
}

pub fn income(month: Option<String>) -> Result<()> {
    by_category(TransactionKind::Income, QueryKind::Income, month)
}

fn by_category(kind: TransactionKind, query_kind: QueryKind, month: Option<String>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let payload = month_query(query_kind, month.as_deref());
    let today = Local::now().date_naive();
    let (start, end) = reports::date_bounds(payload.time_range, &payload.time_value, today);

    let label = match kind {
        TransactionKind::Expense => "支出",
        TransactionKind::Income => "收入",
    };
    let totals = reports::sum_by_category(&conn, &payload, kind, start, end)?;
    if totals.is_empty() {
        println!("{} ~ {} 沒有{label}紀錄。", start, end);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["分類", "金額", "筆數"]);
    let mut sum = 0.0;
    for row in &totals {
        sum += row.total;
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(fmt::money(row.total)).set_alignment(CellAlignment::Right),
            Cell::new(row.count).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{label}報表 {start} ~ {end}\n{table}");
    println!("合計:{}", fmt::money(sum));
    Ok(())
}

pub fn balance() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let accounts = db::list_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["帳戶", "餘額"]);
    let mut total = 0.0;
    for account in &accounts {
        total += account.balance;
        table.add_row(vec![
            Cell::new(&account.name),
            Cell::new(fmt::money(account.balance)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("合計"),
        Cell::new(fmt::money(total)).set_alignment(CellAlignment::Right),
    ]);
    println!("帳戶餘額\n{table}");
    Ok(())
}
