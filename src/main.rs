mod classify;
mod cli;
mod columns;
mod convert;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod normalize;
mod reports;
mod settings;
mod sheet;
mod store;

use clap::{CommandFactory, Parser};

use cli::{
    CategoriesCommands, Cli, Commands, ReportCommands, RulesCommands, TagsCommands,
    TransactionsCommands,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, profile } => cli::init::run(data_dir, profile),
        Commands::Import { file } => cli::import::run(&file),
        Commands::Transactions { command } => match command {
            TransactionsCommands::List {
                year,
                month,
                category,
                tag,
                search,
            } => cli::transactions::list(
                year,
                month,
                category.as_deref(),
                tag.as_deref(),
                search.as_deref(),
            ),
            TransactionsCommands::SetCategory {
                id,
                category,
                save_rule,
            } => cli::transactions::set_category(id, &category, save_rule),
            TransactionsCommands::Memo { id, content } => {
                cli::transactions::memo(id, content.as_deref())
            }
            TransactionsCommands::Tag { id, name } => cli::transactions::tag(id, &name),
            TransactionsCommands::Untag { id, name } => cli::transactions::untag(id, &name),
            TransactionsCommands::Delete { id } => cli::transactions::delete(id),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::Add { name, color } => cli::categories::add(&name, &color),
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Update { id, name, color } => {
                cli::categories::update(id, name.as_deref(), color.as_deref())
            }
            CategoriesCommands::Delete { id } => cli::categories::delete(id),
        },
        Commands::Tags { command } => match command {
            TagsCommands::List => cli::tags::list(),
            TagsCommands::Search { query } => cli::tags::search(&query),
        },
        Commands::Rules { command } => match command {
            RulesCommands::Set { pattern, category } => cli::rules::set(&pattern, &category),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Delete { pattern } => cli::rules::delete(&pattern),
            RulesCommands::Uncategorized => cli::rules::uncategorized(),
        },
        Commands::Report { command } => match command {
            ReportCommands::Monthly { year, month } => cli::report::monthly(year, month),
            ReportCommands::Yearly { year } => cli::report::yearly(year),
            ReportCommands::Tags { year, month } => cli::report::tags(year, month),
            ReportCommands::Range { from, to } => cli::report::range(&from, &to),
        },
        Commands::Status => cli::status::run(),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
