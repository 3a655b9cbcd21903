use serde_json::json;

use crate::error::Result;
use crate::settings::Settings;
use crate::store::{self, str_field, Database, Row};

/// Key/value rows in the user_preferences table. Display preferences are
/// mirrored here from settings.json so a full backup carries them with the
/// data files.
pub fn get_pref(db: &Database, key: &str) -> Result<Option<String>> {
    Ok(db
        .rows(store::USER_PREFERENCES)?
        .iter()
        .find(|row| str_field(row, "key") == Some(key))
        .and_then(|row| str_field(row, "value").map(str::to_string)))
}

pub fn set_pref(db: &mut Database, key: &str, value: &str) -> Result<()> {
    let mut rows = db.rows(store::USER_PREFERENCES)?.to_vec();
    match rows
        .iter_mut()
        .find(|row| str_field(row, "key") == Some(key))
    {
        Some(row) => {
            row.insert("value".into(), json!(value));
        }
        None => {
            let mut row = Row::new();
            row.insert("key".into(), json!(key));
            row.insert("value".into(), json!(value));
            rows.push(row);
        }
    }
    db.set_rows(store::USER_PREFERENCES, rows)
}

pub fn mirror_settings(db: &mut Database, settings: &Settings) -> Result<()> {
    set_pref(db, "currency_code", &settings.currency_code)?;
    set_pref(db, "decimal_separator", &settings.decimal_separator)?;
    set_pref(db, "thousands_separator", &settings.thousands_separator)?;
    set_pref(db, "date_format", &settings.date_format)?;
    set_pref(db, "language", &settings.language)?;
    Ok(())
}
