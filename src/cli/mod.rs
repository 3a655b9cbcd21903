pub mod accounts;
pub mod backup;
pub mod categories;
pub mod currencies;
pub mod init;
pub mod log;
pub mod migrate;
pub mod notifications;
pub mod reset;
pub mod settings;
pub mod transactions;

use clap::{Parser, Subcommand};

use crate::error::{MintyError, Result};
use crate::files::DirStorage;
use crate::settings::{get_data_dir, settings_file_exists};
use crate::store::Database;

/// Open the store at the configured data directory.
pub(crate) fn open_db() -> Result<Database> {
    if !settings_file_exists() {
        return Err(MintyError::Settings(
            "no settings found; run `minty init` first".to_string(),
        ));
    }
    Database::open(Box::new(DirStorage::new(get_data_dir())))
}

#[derive(Parser)]
#[command(name = "minty", about = "Spreadsheet-backed personal finance tracker.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Minty: choose a data directory and create the table files.
    Init {
        /// Path for Minty data (default: ~/Documents/minty)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage transactions.
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// Manage categories and subcategories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage tags.
    Tags {
        #[command(subcommand)]
        command: TagsCommands,
    },
    /// Manage transaction groups.
    Groups {
        #[command(subcommand)]
        command: GroupsCommands,
    },
    /// Manage currencies.
    Currencies {
        #[command(subcommand)]
        command: CurrenciesCommands,
    },
    /// Notification center.
    Notifications {
        #[command(subcommand)]
        command: NotificationsCommands,
    },
    /// Run or roll back one-time data migrations.
    Migrate {
        #[command(subcommand)]
        command: MigrateCommands,
    },
    /// Create or verify a full backup bundle.
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Show or change display settings.
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Show or clear the application log.
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// Delete ALL data. Requires a typed confirmation code.
    Reset {
        /// Confirmation code issued by a previous `reset` invocation.
        #[arg(long)]
        confirm: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        /// Account name, e.g. 'Joint Checking'
        name: String,
        /// Account type: checking, savings, credit_card, cash
        #[arg(long = "type", default_value = "checking")]
        account_type: String,
        /// Currency code (default: the configured default currency)
        #[arg(long)]
        currency: Option<String>,
    },
    /// List all accounts.
    List,
    /// Rename an account.
    Rename {
        /// Account name or id
        account: String,
        new_name: String,
    },
    /// Delete an account (rejected while transactions reference it).
    Delete {
        /// Account name or id
        account: String,
    },
    /// Include or exclude an account's transactions from overview totals.
    Toggle {
        /// Account name or id
        account: String,
    },
    /// Re-sequence accounts into the given order (list every account once).
    Reorder {
        /// Account names or ids, first to last
        accounts: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Add a transaction.
    Add {
        /// Account name or id
        #[arg(long)]
        account: String,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Description
        description: String,
        /// Amount (negative for spending)
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// Subcategory name or id
        #[arg(long)]
        subcategory: Option<String>,
        /// Group name (created on first use)
        #[arg(long)]
        group: Option<String>,
    },
    /// List transactions.
    List {
        /// Filter by account name or id
        #[arg(long)]
        account: Option<String>,
        /// Filter by month: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Edit a transaction.
    Edit {
        /// Transaction id
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<f64>,
        /// Subcategory name or id ('none' to clear)
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a transaction.
    Delete {
        /// Transaction id
        id: String,
    },
    /// Tie a transaction to an external statement reference.
    Reconcile {
        /// Transaction id
        id: String,
        /// Statement reference, e.g. STMT-2026-01
        reference: String,
    },
    /// Clear a transaction's statement reference.
    Unreconcile {
        /// Transaction id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add { name: String },
    /// List categories with their subcategories.
    List,
    /// Rename a category.
    Rename { category: String, new_name: String },
    /// Delete a category (rejected while it has subcategories).
    Delete { category: String },
    /// Re-sequence categories into the given order.
    Reorder { categories: Vec<String> },
    /// Add a subcategory under a category.
    AddSub {
        /// Parent category name or id
        category: String,
        name: String,
    },
    /// Rename a subcategory.
    RenameSub { subcategory: String, new_name: String },
    /// Delete a subcategory (rejected while transactions reference it).
    DeleteSub { subcategory: String },
}

#[derive(Subcommand)]
pub enum TagsCommands {
    /// Add a tag.
    Add { name: String },
    /// List tags.
    List,
    /// Rename a tag.
    Rename { tag: String, new_name: String },
    /// Delete a tag (rejected while transactions reference it).
    Delete { tag: String },
}

#[derive(Subcommand)]
pub enum GroupsCommands {
    /// List transaction groups.
    List,
    /// Delete an empty transaction group.
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum CurrenciesCommands {
    /// List currencies.
    List,
    /// Add a currency.
    Add {
        /// ISO code, e.g. CHF
        code: String,
        /// Display symbol
        #[arg(long)]
        symbol: String,
        /// Decimal places
        #[arg(long, default_value = "2")]
        decimals: u32,
    },
    /// Set the default currency.
    SetDefault { code: String },
}

#[derive(Subcommand)]
pub enum NotificationsCommands {
    /// List notifications.
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },
    /// Mark a notification as read.
    MarkRead { id: String },
    /// Remove all notifications.
    Clear,
}

#[derive(Subcommand)]
pub enum MigrateCommands {
    /// List migrations with status and precondition checks.
    List,
    /// Run one migration (backs up affected tables first).
    Run {
        /// Migration name (see `minty migrate list`)
        name: String,
    },
    /// Restore affected tables from a migration's backup.
    Rollback {
        /// Migration name
        name: String,
        /// Backup suffix printed by the original run
        suffix: String,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Copy all table files plus a manifest into a date-stamped bundle.
    Create,
    /// Check a bundle's files against its manifest checksums.
    Verify {
        /// Path to a backup bundle directory
        path: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings.
    Show,
    /// Change a setting: currency, decimal-sep, thousands-sep, date-format, language.
    Set {
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
pub enum LogCommands {
    /// Show recent log entries.
    Show {
        /// Max entries to show
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Clear the log.
    Clear,
}
