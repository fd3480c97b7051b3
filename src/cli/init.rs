use colored::Colorize;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists, Settings};

pub fn run(data_dir: Option<String>, name: Option<String>) -> Result<()> {
    let mut settings = if settings_file_exists() {
        load_settings()
    } else {
        Settings::default()
    };
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(name) = name {
        settings.user_name = name;
    }

    std::fs::create_dir_all(&settings.data_dir)?;
    let db_path = std::path::Path::new(&settings.data_dir).join("zhangfang.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("{}", "zhangfang 已就緒。".green());
    println!("資料庫:{}", db_path.display());
    if !settings.user_name.is_empty() {
        println!("使用者:{}", settings.user_name);
    }
    println!("執行 `zhangfang chat` 開始記帳。");
    Ok(())
}
