use thiserror::Error;

#[derive(Error, Debug)]
pub enum MintyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown subcategory: {0}")]
    UnknownSubcategory(String),

    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("No row with id {id} in table {table}")]
    RowNotFound { table: String, id: String },

    #[error("{entity} '{name}' is used in {count} transactions")]
    InUse {
        entity: &'static str,
        name: String,
        count: usize,
    },

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Migration '{name}' cannot run: {reason}")]
    PreconditionFailed { name: String, reason: String },

    #[error("Migration '{name}' failed validation: {reason}")]
    ValidationFailed { name: String, reason: String },

    #[error("Backup table {0} is missing; cannot roll back")]
    MissingBackup(String),

    #[error("Unknown migration: {0}")]
    UnknownMigration(String),

    #[error("Confirmation code did not match; nothing was deleted")]
    ConfirmationMismatch,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MintyError>;
