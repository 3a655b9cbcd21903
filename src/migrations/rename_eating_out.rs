use serde_json::json;

use crate::error::{MintyError, Result};
use crate::migrate::{CanRun, Migration};
use crate::store::{self, str_field, Database};

const OLD_NAME: &str = "Dining Out";
const NEW_NAME: &str = "Eating Out";

/// Renames the "Dining Out" subcategory to "Eating Out". Transactions keep
/// pointing at the same subcategory id, so only the one row changes.
pub struct RenameEatingOut;

impl Migration for RenameEatingOut {
    fn name(&self) -> &'static str {
        "rename_eating_out"
    }

    fn version(&self) -> u32 {
        1
    }

    fn affected_tables(&self) -> &'static [&'static str] {
        &[store::SUBCATEGORIES]
    }

    fn can_run(&self, db: &Database) -> Result<CanRun> {
        let names: Vec<&str> = db
            .rows(store::SUBCATEGORIES)?
            .iter()
            .filter_map(|row| str_field(row, "name"))
            .collect();
        if names.contains(&NEW_NAME) {
            return Ok(CanRun::no(format!(
                "subcategory '{NEW_NAME}' already exists"
            )));
        }
        if !names.contains(&OLD_NAME) {
            return Ok(CanRun::no(format!("subcategory '{OLD_NAME}' not found")));
        }
        Ok(CanRun::yes())
    }

    fn apply(&self, db: &mut Database) -> Result<()> {
        let id = db
            .rows(store::SUBCATEGORIES)?
            .iter()
            .find(|row| str_field(row, "name") == Some(OLD_NAME))
            .and_then(|row| str_field(row, "id"))
            .map(str::to_string)
            .ok_or_else(|| MintyError::UnknownSubcategory(OLD_NAME.to_string()))?;
        db.update(store::SUBCATEGORIES, &id, |row| {
            row.insert("name".into(), json!(NEW_NAME));
        })
    }

    fn verify(&self, db: &Database) -> Result<()> {
        let names: Vec<&str> = db
            .rows(store::SUBCATEGORIES)?
            .iter()
            .filter_map(|row| str_field(row, "name"))
            .collect();
        if names.contains(&OLD_NAME) || !names.contains(&NEW_NAME) {
            return Err(MintyError::Other(format!(
                "expected '{NEW_NAME}' to replace '{OLD_NAME}'"
            )));
        }
        Ok(())
    }
}
