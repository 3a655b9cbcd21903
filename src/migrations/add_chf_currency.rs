use crate::currencies::{add_currency, find_currency};
use crate::error::{MintyError, Result};
use crate::migrate::{CanRun, Migration};
use crate::store::{self, Database};

/// Adds the Swiss franc to the currencies table.
pub struct AddChfCurrency;

impl Migration for AddChfCurrency {
    fn name(&self) -> &'static str {
        "add_chf_currency"
    }

    fn version(&self) -> u32 {
        1
    }

    fn affected_tables(&self) -> &'static [&'static str] {
        &[store::CURRENCIES]
    }

    fn can_run(&self, db: &Database) -> Result<CanRun> {
        if find_currency(db, "CHF").is_ok() {
            Ok(CanRun::no("currency 'CHF' already exists"))
        } else {
            Ok(CanRun::yes())
        }
    }

    fn apply(&self, db: &mut Database) -> Result<()> {
        add_currency(db, "CHF", "CHF", 2)?;
        Ok(())
    }

    fn verify(&self, db: &Database) -> Result<()> {
        find_currency(db, "CHF")
            .map(|_| ())
            .map_err(|_| MintyError::Other("CHF row missing after insert".to_string()))
    }
}
