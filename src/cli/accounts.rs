use comfy_table::{Cell, Table};

use crate::db::{self, get_connection};
use crate::error::Result;
use crate::fmt;
use crate::settings::db_path;

pub fn add(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    if db::find_account(&conn, name)?.is_some() {
        println!("帳戶「{name}」已存在。");
        return Ok(());
    }
    db::find_or_create_account(&conn, name)?;
    println!("已新增帳戶:{name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let accounts = db::list_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "名稱", "餘額", "預設"]);
    let mut total = 0.0;
    for account in &accounts {
        total += account.balance;
        table.add_row(vec![
            Cell::new(account.id),
            Cell::new(&account.name),
            Cell::new(fmt::money(account.balance)),
            Cell::new(if account.is_default { "✓" } else { "" }),
        ]);
    }
    println!("帳戶\n{table}");
    println!("合計:{}", fmt::money(total));
    Ok(())
}
