pub mod accounts;
pub mod chat;
pub mod demo;
pub mod init;
pub mod parse;
pub mod reminders;
pub mod report;

use clap::{Parser, Subcommand};

use crate::models::{QueryKind, QueryPayload, TimeRange, TimeValue};

/// "YYYY-MM" → explicit month window; anything else → current month.
pub(crate) fn month_query(kind: QueryKind, month: Option<&str>) -> QueryPayload {
    let time_value = match month {
        Some(m) if m.split_once('-').is_some() => TimeValue::Explicit(m.to_string()),
        _ => TimeValue::Current,
    };
    QueryPayload {
        query_type: kind,
        time_range: TimeRange::Month,
        time_value,
        category: None,
        account: None,
    }
}

#[derive(Parser)]
#[command(name = "zhangfang", about = "記帳與提醒聊天機器人 — bookkeeping and reminders in plain Chinese.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up zhangfang: choose a data directory and initialize the database.
    Init {
        /// Path for zhangfang data (default: ~/Documents/zhangfang)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Your name, used in chat greetings
        #[arg(long)]
        name: Option<String>,
    },
    /// Chat with the bot: every line is a message, Ctrl-D or "exit" quits.
    Chat,
    /// Parse one message and print the result without touching the database.
    Parse {
        /// The message to parse
        text: String,
        /// Print the structured result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage reminders.
    Reminders {
        #[command(subcommand)]
        command: RemindersCommands,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Load sample messages to explore zhangfang.
    Demo,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        /// Account name
        name: String,
    },
    /// List accounts with balances.
    List,
}

#[derive(Subcommand)]
pub enum RemindersCommands {
    /// List reminders.
    List {
        /// Include completed reminders
        #[arg(long)]
        all: bool,
    },
    /// Show reminders whose notification window is open, and roll them over.
    Due,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Expenses by category.
    Expense {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Income by category.
    Income {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Account balances.
    Balance,
}
