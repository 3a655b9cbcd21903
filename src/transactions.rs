use regex::Regex;
use serde_json::json;

use crate::error::{MintyError, Result};
use crate::models::{from_row, to_row, Transaction, TransactionGroup};
use crate::store::{self, str_field, Database};

fn validate_date(date: &str) -> Result<()> {
    // chrono would accept e.g. 2026-1-5; the store keeps strict ISO keys
    let iso = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    if !iso.is_match(date) || chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(MintyError::Invalid {
            field: "date",
            reason: format!("'{date}' is not a valid YYYY-MM-DD date"),
        });
    }
    Ok(())
}

pub fn add_transaction(
    db: &mut Database,
    account_id: &str,
    date: &str,
    description: &str,
    amount: f64,
) -> Result<Transaction> {
    validate_date(date)?;
    if db.find(store::ACCOUNTS, account_id)?.is_none() {
        return Err(MintyError::UnknownAccount(account_id.to_string()));
    }
    let tx = Transaction {
        id: store::new_id(),
        account_id: account_id.to_string(),
        date: date.to_string(),
        description: description.to_string(),
        amount,
        subcategory_id: None,
        group_id: None,
        tag_ids: Vec::new(),
        statement_ref: None,
        notes: None,
    };
    db.insert(store::TRANSACTIONS, to_row(&tx)?)?;
    Ok(tx)
}

pub fn list_transactions(
    db: &Database,
    account_id: Option<&str>,
    month: Option<&str>,
) -> Result<Vec<Transaction>> {
    let mut txs: Vec<Transaction> = db
        .rows(store::TRANSACTIONS)?
        .iter()
        .map(from_row)
        .collect::<Result<_>>()?;
    if let Some(account_id) = account_id {
        txs.retain(|t| t.account_id == account_id);
    }
    if let Some(month) = month {
        txs.retain(|t| t.date.starts_with(month));
    }
    txs.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(txs)
}

pub struct TransactionEdit<'a> {
    pub date: Option<&'a str>,
    pub description: Option<&'a str>,
    pub amount: Option<f64>,
    pub subcategory_id: Option<Option<&'a str>>,
    pub notes: Option<Option<&'a str>>,
}

pub fn edit_transaction(db: &mut Database, id: &str, edit: TransactionEdit<'_>) -> Result<()> {
    if let Some(date) = edit.date {
        validate_date(date)?;
    }
    if let Some(Some(sub_id)) = edit.subcategory_id {
        if db.find(store::SUBCATEGORIES, sub_id)?.is_none() {
            return Err(MintyError::UnknownSubcategory(sub_id.to_string()));
        }
    }
    db.update(store::TRANSACTIONS, id, |row| {
        if let Some(date) = edit.date {
            row.insert("date".into(), json!(date));
        }
        if let Some(description) = edit.description {
            row.insert("description".into(), json!(description));
        }
        if let Some(amount) = edit.amount {
            row.insert("amount".into(), json!(amount));
        }
        if let Some(sub) = edit.subcategory_id {
            row.insert("subcategory_id".into(), json!(sub));
        }
        if let Some(notes) = edit.notes {
            row.insert("notes".into(), json!(notes));
        }
    })
}

pub fn delete_transaction(db: &mut Database, id: &str) -> Result<()> {
    db.delete(store::TRANSACTIONS, id)
}

/// Mark a transaction as reconciled against an external statement.
pub fn reconcile(db: &mut Database, id: &str, statement_ref: &str) -> Result<()> {
    if statement_ref.trim().is_empty() {
        return Err(MintyError::Invalid {
            field: "statement_ref",
            reason: "statement reference cannot be empty".to_string(),
        });
    }
    let statement_ref = statement_ref.trim().to_string();
    db.update(store::TRANSACTIONS, id, |row| {
        row.insert("statement_ref".into(), json!(statement_ref));
    })
}

/// Clear a transaction's statement reference.
pub fn unreconcile(db: &mut Database, id: &str) -> Result<()> {
    db.update(store::TRANSACTIONS, id, |row| {
        row.insert("statement_ref".into(), json!(null));
    })
}

/// Attach a transaction to a named group, creating the group on first use.
pub fn assign_group(db: &mut Database, tx_id: &str, group_name: &str) -> Result<TransactionGroup> {
    let existing = db
        .rows(store::TRANSACTION_GROUPS)?
        .iter()
        .map(from_row::<TransactionGroup>)
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .find(|g| g.name.eq_ignore_ascii_case(group_name));
    let group = match existing {
        Some(group) => group,
        None => {
            let group = TransactionGroup {
                id: store::new_id(),
                name: group_name.to_string(),
            };
            db.insert(store::TRANSACTION_GROUPS, to_row(&group)?)?;
            group
        }
    };
    let group_id = group.id.clone();
    db.update(store::TRANSACTIONS, tx_id, |row| {
        row.insert("group_id".into(), json!(group_id));
    })?;
    Ok(group)
}

pub fn list_groups(db: &Database) -> Result<Vec<TransactionGroup>> {
    db.rows(store::TRANSACTION_GROUPS)?
        .iter()
        .map(from_row)
        .collect()
}

/// Groups can only be removed once no transaction points at them.
pub fn delete_group(db: &mut Database, id: &str) -> Result<()> {
    let group: TransactionGroup = from_row(db.get(store::TRANSACTION_GROUPS, id)?)?;
    let used = db
        .rows(store::TRANSACTIONS)?
        .iter()
        .filter(|row| str_field(row, "group_id") == Some(id))
        .count();
    if used > 0 {
        return Err(MintyError::InUse {
            entity: "Group",
            name: group.name,
            count: used,
        });
    }
    db.delete(store::TRANSACTION_GROUPS, id)
}
