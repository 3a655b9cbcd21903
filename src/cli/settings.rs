use crate::cli::open_db;
use crate::error::{MintyError, Result};
use crate::prefs::mirror_settings;
use crate::settings::{load_settings, save_settings};

pub fn show() -> Result<()> {
    let settings = load_settings();
    println!("data_dir:      {}", settings.data_dir);
    println!("currency:      {}", settings.currency_code);
    println!("decimal-sep:   {}", settings.decimal_separator);
    println!("thousands-sep: {}", settings.thousands_separator);
    println!("date-format:   {}", settings.date_format);
    println!("language:      {}", settings.language);
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    match key {
        "currency" => settings.currency_code = value.to_uppercase(),
        "decimal-sep" => settings.decimal_separator = value.to_string(),
        "thousands-sep" => settings.thousands_separator = value.to_string(),
        "date-format" => settings.date_format = value.to_string(),
        "language" => settings.language = value.to_string(),
        other => {
            return Err(MintyError::Settings(format!(
                "unknown setting '{other}' (expected currency, decimal-sep, thousands-sep, date-format, language)"
            )))
        }
    }
    save_settings(&settings)?;

    // keep the user_preferences table in step with settings.json
    let mut db = open_db()?;
    mirror_settings(&mut db, &settings)?;
    println!("Set {key} = {value}");
    Ok(())
}
