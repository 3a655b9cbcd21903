use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::accounts::{
    add_account, delete_account, list_accounts, rename_account, reorder_accounts,
    resolve_account, set_include_in_overview,
};
use crate::cli::open_db;
use crate::error::Result;
use crate::fmt;
use crate::prefs::get_pref;
use crate::settings::load_settings;

pub fn add(name: &str, account_type: &str, currency: Option<&str>) -> Result<()> {
    let mut db = open_db()?;
    let currency = match currency {
        Some(code) => code.to_uppercase(),
        None => get_pref(&db, "currency_code")?
            .unwrap_or_else(|| load_settings().currency_code),
    };
    let account = add_account(&mut db, name, account_type, &currency)?;
    println!("Added account: {} ({})", account.name, account.id);
    Ok(())
}

pub fn list() -> Result<()> {
    let db = open_db()?;
    let accounts = list_accounts(&db)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "ID", "Name", "Type", "Currency", "In Overview"]);
    for account in &accounts {
        table.add_row(vec![
            Cell::new(account.order),
            Cell::new(&account.id),
            Cell::new(&account.name),
            Cell::new(&account.account_type),
            Cell::new(&account.currency_code),
            Cell::new(if account.include_in_overview { "yes" } else { "no" }),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}

pub fn rename(account: &str, new_name: &str) -> Result<()> {
    let mut db = open_db()?;
    let account = resolve_account(&db, account)?;
    rename_account(&mut db, &account.id, new_name)?;
    println!("Renamed '{}' to '{new_name}'", account.name);
    Ok(())
}

pub fn delete(account: &str) -> Result<()> {
    let mut db = open_db()?;
    let account = resolve_account(&db, account)?;
    delete_account(&mut db, &account.id)?;
    println!("Deleted account: {}", account.name);
    Ok(())
}

pub fn toggle(account: &str) -> Result<()> {
    let mut db = open_db()?;
    let account = resolve_account(&db, account)?;
    let included = !account.include_in_overview;
    set_include_in_overview(&mut db, &account.id, included)?;
    if included {
        println!("{} now counts toward overview totals", account.name);
    } else {
        println!(
            "{} {} from overview totals",
            account.name,
            "excluded".yellow()
        );
    }
    Ok(())
}

pub fn reorder(accounts: &[String]) -> Result<()> {
    let mut db = open_db()?;
    let mut ids = Vec::with_capacity(accounts.len());
    for name in accounts {
        ids.push(resolve_account(&db, name)?.id);
    }
    reorder_accounts(&mut db, &ids)?;
    println!("Reordered {} accounts", ids.len());
    Ok(())
}

/// Overview balance line used by `tx list` when no filters are given;
/// accounts toggled out of the overview are skipped.
pub fn overview_total(db: &crate::store::Database) -> Result<String> {
    let settings = load_settings();
    let included: Vec<String> = list_accounts(db)?
        .into_iter()
        .filter(|a| a.include_in_overview)
        .map(|a| a.id)
        .collect();
    let total: f64 = crate::transactions::list_transactions(db, None, None)?
        .iter()
        .filter(|t| included.contains(&t.account_id))
        .map(|t| t.amount)
        .sum();
    let (symbol, decimals) = currency_display(db, &settings.currency_code)?;
    Ok(fmt::money(total, &symbol, decimals, &settings))
}

/// Symbol and decimal places of the default currency, falling back to a
/// two-decimal dollar when the code is unknown.
pub(crate) fn currency_display(
    db: &crate::store::Database,
    fallback_code: &str,
) -> Result<(String, u32)> {
    let code = get_pref(db, "currency_code")?.unwrap_or_else(|| fallback_code.to_string());
    Ok(crate::currencies::find_currency(db, &code)
        .map(|c| (c.symbol, c.decimals))
        .unwrap_or_else(|_| ("$".to_string(), 2)))
}
