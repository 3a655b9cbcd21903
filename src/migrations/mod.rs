//! One-off scripted data fixes. Each script owns a single edit and its
//! post-condition; backup, idempotence and rollback are handled by the
//! runner in `crate::migrate`. Scripts are deliberately independent of each
//! other: there is no ordering or dependency between them.

mod add_chf_currency;
mod backfill_account_order;
mod merge_duplicate_tags;
mod normalize_transaction_dates;
mod rename_eating_out;

pub use add_chf_currency::AddChfCurrency;
pub use backfill_account_order::BackfillAccountOrder;
pub use merge_duplicate_tags::MergeDuplicateTags;
pub use normalize_transaction_dates::NormalizeTransactionDates;
pub use rename_eating_out::RenameEatingOut;

use crate::error::{MintyError, Result};
use crate::migrate::Migration;

pub fn all_migrations() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(RenameEatingOut),
        Box::new(AddChfCurrency),
        Box::new(BackfillAccountOrder),
        Box::new(MergeDuplicateTags),
        Box::new(NormalizeTransactionDates),
    ]
}

pub fn find_migration(name: &str) -> Result<Box<dyn Migration>> {
    all_migrations()
        .into_iter()
        .find(|m| m.name() == name)
        .ok_or_else(|| MintyError::UnknownMigration(name.to_string()))
}
