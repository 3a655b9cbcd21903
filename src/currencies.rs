use crate::error::{MintyError, Result};
use crate::models::{from_row, to_row, Currency};
use crate::prefs::set_pref;
use crate::store::{self, Database};

// (code, symbol, decimals)
pub const DEFAULT_CURRENCIES: &[(&str, &str, u32)] = &[
    ("USD", "$", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("JPY", "¥", 0),
];

pub fn list_currencies(db: &Database) -> Result<Vec<Currency>> {
    db.rows(store::CURRENCIES)?.iter().map(from_row).collect()
}

pub fn find_currency(db: &Database, code: &str) -> Result<Currency> {
    list_currencies(db)?
        .into_iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
        .ok_or_else(|| MintyError::UnknownCurrency(code.to_string()))
}

pub fn add_currency(db: &mut Database, code: &str, symbol: &str, decimals: u32) -> Result<Currency> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(MintyError::Invalid {
            field: "code",
            reason: "currency code cannot be empty".to_string(),
        });
    }
    if find_currency(db, &code).is_ok() {
        return Err(MintyError::Invalid {
            field: "code",
            reason: format!("currency '{code}' already exists"),
        });
    }
    let currency = Currency {
        id: store::new_id(),
        code,
        symbol: symbol.to_string(),
        decimals,
    };
    db.insert(store::CURRENCIES, to_row(&currency)?)?;
    Ok(currency)
}

/// Seed the standard currencies on first run; a populated table is left
/// alone.
pub fn seed_currencies(db: &mut Database) -> Result<()> {
    if !db.rows(store::CURRENCIES)?.is_empty() {
        return Ok(());
    }
    for (code, symbol, decimals) in DEFAULT_CURRENCIES {
        add_currency(db, code, symbol, *decimals)?;
    }
    Ok(())
}

/// Make a currency the default used for formatting and new accounts. Must
/// already exist in the currencies table; mirrored to user_preferences.
pub fn set_default_currency(db: &mut Database, code: &str) -> Result<Currency> {
    let currency = find_currency(db, code)?;
    set_pref(db, "currency_code", &currency.code)?;
    Ok(currency)
}
