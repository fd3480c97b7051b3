mod cli;
mod db;
mod error;
mod fmt;
mod handler;
mod models;
mod parser;
mod reminders;
mod reports;
mod settings;

use clap::Parser;

use cli::{AccountsCommands, Cli, Commands, RemindersCommands, ReportCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, name } => cli::init::run(data_dir, name),
        Commands::Chat => cli::chat::run(),
        Commands::Parse { text, json } => cli::parse::run(&text, json),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add { name } => cli::accounts::add(&name),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Reminders { command } => match command {
            RemindersCommands::List { all } => cli::reminders::list(all),
            RemindersCommands::Due => cli::reminders::due(),
        },
        Commands::Report { command } => match command {
            ReportCommands::Expense { month } => cli::report::expense(month),
            ReportCommands::Income { month } => cli::report::income(month),
            ReportCommands::Balance => cli::report::balance(),
        },
        Commands::Demo => cli::demo::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
