mod accounts;
mod backup;
mod categories;
mod cli;
mod currencies;
mod error;
mod files;
mod fmt;
mod logger;
mod migrate;
mod migrations;
mod models;
mod notify;
mod prefs;
mod settings;
mod store;
mod transactions;

use clap::Parser;

use cli::{
    AccountsCommands, BackupCommands, CategoriesCommands, Cli, Commands, CurrenciesCommands,
    GroupsCommands, LogCommands, MigrateCommands, NotificationsCommands, SettingsCommands,
    TagsCommands, TxCommands,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                account_type,
                currency,
            } => cli::accounts::add(&name, &account_type, currency.as_deref()),
            AccountsCommands::List => cli::accounts::list(),
            AccountsCommands::Rename { account, new_name } => {
                cli::accounts::rename(&account, &new_name)
            }
            AccountsCommands::Delete { account } => cli::accounts::delete(&account),
            AccountsCommands::Toggle { account } => cli::accounts::toggle(&account),
            AccountsCommands::Reorder { accounts } => cli::accounts::reorder(&accounts),
        },
        Commands::Tx { command } => match command {
            TxCommands::Add {
                account,
                date,
                description,
                amount,
                subcategory,
                group,
            } => cli::transactions::add(
                &account,
                &date,
                &description,
                amount,
                subcategory.as_deref(),
                group.as_deref(),
            ),
            TxCommands::List { account, month } => {
                cli::transactions::list(account.as_deref(), month.as_deref())
            }
            TxCommands::Edit {
                id,
                date,
                description,
                amount,
                subcategory,
                notes,
            } => cli::transactions::edit(
                &id,
                date.as_deref(),
                description.as_deref(),
                amount,
                subcategory.as_deref(),
                notes.as_deref(),
            ),
            TxCommands::Delete { id } => cli::transactions::delete(&id),
            TxCommands::Reconcile { id, reference } => {
                cli::transactions::reconcile_cmd(&id, &reference)
            }
            TxCommands::Unreconcile { id } => cli::transactions::unreconcile_cmd(&id),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::Add { name } => cli::categories::add(&name),
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Rename { category, new_name } => {
                cli::categories::rename(&category, &new_name)
            }
            CategoriesCommands::Delete { category } => cli::categories::delete(&category),
            CategoriesCommands::Reorder { categories } => cli::categories::reorder(&categories),
            CategoriesCommands::AddSub { category, name } => {
                cli::categories::add_sub(&category, &name)
            }
            CategoriesCommands::RenameSub {
                subcategory,
                new_name,
            } => cli::categories::rename_sub(&subcategory, &new_name),
            CategoriesCommands::DeleteSub { subcategory } => {
                cli::categories::delete_sub(&subcategory)
            }
        },
        Commands::Tags { command } => match command {
            TagsCommands::Add { name } => cli::categories::tag_add(&name),
            TagsCommands::List => cli::categories::tag_list(),
            TagsCommands::Rename { tag, new_name } => cli::categories::tag_rename(&tag, &new_name),
            TagsCommands::Delete { tag } => cli::categories::tag_delete(&tag),
        },
        Commands::Groups { command } => match command {
            GroupsCommands::List => cli::transactions::list_groups(),
            GroupsCommands::Delete { id } => cli::transactions::delete_group(&id),
        },
        Commands::Currencies { command } => match command {
            CurrenciesCommands::List => cli::currencies::list(),
            CurrenciesCommands::Add {
                code,
                symbol,
                decimals,
            } => cli::currencies::add(&code, &symbol, decimals),
            CurrenciesCommands::SetDefault { code } => cli::currencies::set_default(&code),
        },
        Commands::Notifications { command } => match command {
            NotificationsCommands::List { unread } => cli::notifications::list(unread),
            NotificationsCommands::MarkRead { id } => cli::notifications::mark_read(&id),
            NotificationsCommands::Clear => cli::notifications::clear(),
        },
        Commands::Migrate { command } => match command {
            MigrateCommands::List => cli::migrate::list(),
            MigrateCommands::Run { name } => cli::migrate::run(&name),
            MigrateCommands::Rollback { name, suffix } => cli::migrate::rollback(&name, &suffix),
        },
        Commands::Backup { command } => match command {
            BackupCommands::Create => cli::backup::create(),
            BackupCommands::Verify { path } => cli::backup::verify(&path),
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show => cli::settings::show(),
            SettingsCommands::Set { key, value } => cli::settings::set(&key, &value),
        },
        Commands::Log { command } => match command {
            LogCommands::Show { limit } => cli::log::show(limit),
            LogCommands::Clear => cli::log::clear(),
        },
        Commands::Reset { confirm } => cli::reset::run(confirm.as_deref()),
    };

    if let Err(e) = result {
        logger::Logger::open().error(format!("command failed: {e}"), None);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
