use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::currencies::{add_currency, list_currencies, set_default_currency};
use crate::error::Result;
use crate::prefs::get_pref;

pub fn list() -> Result<()> {
    let db = open_db()?;
    let default = get_pref(&db, "currency_code")?.unwrap_or_default();
    let mut table = Table::new();
    table.set_header(vec!["Code", "Symbol", "Decimals", "Default"]);
    for currency in list_currencies(&db)? {
        table.add_row(vec![
            Cell::new(&currency.code),
            Cell::new(&currency.symbol),
            Cell::new(currency.decimals),
            Cell::new(if currency.code == default { "*" } else { "" }),
        ]);
    }
    println!("Currencies\n{table}");
    Ok(())
}

pub fn add(code: &str, symbol: &str, decimals: u32) -> Result<()> {
    let mut db = open_db()?;
    let currency = add_currency(&mut db, code, symbol, decimals)?;
    println!("Added currency: {} ({})", currency.code, currency.symbol);
    Ok(())
}

pub fn set_default(code: &str) -> Result<()> {
    let mut db = open_db()?;
    let currency = set_default_currency(&mut db, code)?;
    println!("Default currency is now {}", currency.code);
    Ok(())
}
