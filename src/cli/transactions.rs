use comfy_table::{Cell, Table};

use crate::accounts::resolve_account;
use crate::categories::resolve_subcategory;
use crate::cli::open_db;
use crate::error::Result;
use crate::fmt;
use crate::settings::load_settings;
use crate::transactions::{
    add_transaction, assign_group, delete_transaction, edit_transaction, list_transactions,
    reconcile, unreconcile, TransactionEdit,
};

#[allow(clippy::too_many_arguments)]
pub fn add(
    account: &str,
    date: &str,
    description: &str,
    amount: f64,
    subcategory: Option<&str>,
    group: Option<&str>,
) -> Result<()> {
    let mut db = open_db()?;
    let account = resolve_account(&db, account)?;
    // resolve references first so a typo aborts before any row is written
    let subcategory_id = match subcategory {
        Some(subcategory) => Some(resolve_subcategory(&db, subcategory)?.id),
        None => None,
    };
    let tx = add_transaction(&mut db, &account.id, date, description, amount)?;
    if let Some(sub_id) = subcategory_id.as_deref() {
        edit_transaction(
            &mut db,
            &tx.id,
            TransactionEdit {
                date: None,
                description: None,
                amount: None,
                subcategory_id: Some(Some(sub_id)),
                notes: None,
            },
        )?;
    }
    if let Some(group) = group {
        assign_group(&mut db, &tx.id, group)?;
    }
    println!("Added transaction {} ({})", tx.id, description);
    Ok(())
}

pub fn list(account: Option<&str>, month: Option<&str>) -> Result<()> {
    let db = open_db()?;
    let settings = load_settings();
    let account_id = match account {
        Some(name) => Some(resolve_account(&db, name)?.id),
        None => None,
    };
    let txs = list_transactions(&db, account_id.as_deref(), month)?;
    let (symbol, decimals) =
        crate::cli::accounts::currency_display(&db, &settings.currency_code)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Reconciled"]);
    for tx in &txs {
        table.add_row(vec![
            Cell::new(&tx.id),
            Cell::new(fmt::date(&tx.date, &settings)),
            Cell::new(&tx.description),
            Cell::new(fmt::money(tx.amount, &symbol, decimals, &settings)),
            Cell::new(if tx.is_reconciled() {
                tx.statement_ref.clone().unwrap_or_default()
            } else {
                String::new()
            }),
        ]);
    }
    println!("Transactions ({})\n{table}", txs.len());

    if account.is_none() && month.is_none() {
        println!("Overview total: {}", crate::cli::accounts::overview_total(&db)?);
    }
    Ok(())
}

pub fn edit(
    id: &str,
    date: Option<&str>,
    description: Option<&str>,
    amount: Option<f64>,
    subcategory: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let mut db = open_db()?;
    let subcategory_id = match subcategory {
        Some("none") => Some(None),
        Some(name) => Some(Some(resolve_subcategory(&db, name)?.id)),
        None => None,
    };
    edit_transaction(
        &mut db,
        id,
        TransactionEdit {
            date,
            description,
            amount,
            subcategory_id: subcategory_id.as_ref().map(|s| s.as_deref()),
            notes: notes.map(Some),
        },
    )?;
    println!("Updated transaction {id}");
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let mut db = open_db()?;
    delete_transaction(&mut db, id)?;
    println!("Deleted transaction {id}");
    Ok(())
}

pub fn reconcile_cmd(id: &str, reference: &str) -> Result<()> {
    let mut db = open_db()?;
    reconcile(&mut db, id, reference)?;
    println!("Reconciled {id} against {reference}");
    Ok(())
}

pub fn unreconcile_cmd(id: &str) -> Result<()> {
    let mut db = open_db()?;
    unreconcile(&mut db, id)?;
    println!("Cleared statement reference on {id}");
    Ok(())
}

pub fn list_groups() -> Result<()> {
    let db = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name"]);
    for group in crate::transactions::list_groups(&db)? {
        table.add_row(vec![Cell::new(&group.id), Cell::new(&group.name)]);
    }
    println!("Groups\n{table}");
    Ok(())
}

pub fn delete_group(id: &str) -> Result<()> {
    let mut db = open_db()?;
    crate::transactions::delete_group(&mut db, id)?;
    println!("Deleted group {id}");
    Ok(())
}
