use serde_json::json;

use crate::error::{MintyError, Result};
use crate::models::{from_row, to_row, Account};
use crate::store::{self, str_field, Database, Row};

pub fn list_accounts(db: &Database) -> Result<Vec<Account>> {
    let mut accounts: Vec<Account> = db
        .rows(store::ACCOUNTS)?
        .iter()
        .map(from_row)
        .collect::<Result<_>>()?;
    accounts.sort_by_key(|a| a.order);
    Ok(accounts)
}

/// Resolve a CLI-supplied account by name (case-insensitive) or id.
pub fn resolve_account(db: &Database, name_or_id: &str) -> Result<Account> {
    let needle = name_or_id.to_lowercase();
    for row in db.rows(store::ACCOUNTS)? {
        let account: Account = from_row(row)?;
        if account.id == name_or_id || account.name.to_lowercase() == needle {
            return Ok(account);
        }
    }
    Err(MintyError::UnknownAccount(name_or_id.to_string()))
}

pub fn add_account(
    db: &mut Database,
    name: &str,
    account_type: &str,
    currency_code: &str,
) -> Result<Account> {
    if name.trim().is_empty() {
        return Err(MintyError::Invalid {
            field: "name",
            reason: "account name cannot be empty".to_string(),
        });
    }
    let next_order = list_accounts(db)?.iter().map(|a| a.order).max().unwrap_or(0) + 1;
    let account = Account {
        id: store::new_id(),
        name: name.trim().to_string(),
        account_type: account_type.to_string(),
        currency_code: currency_code.to_string(),
        include_in_overview: true,
        order: next_order,
    };
    db.insert(store::ACCOUNTS, to_row(&account)?)?;
    Ok(account)
}

pub fn rename_account(db: &mut Database, id: &str, new_name: &str) -> Result<()> {
    if new_name.trim().is_empty() {
        return Err(MintyError::Invalid {
            field: "name",
            reason: "account name cannot be empty".to_string(),
        });
    }
    let new_name = new_name.trim().to_string();
    db.update(store::ACCOUNTS, id, |row| {
        row.insert("name".into(), json!(new_name));
    })
}

/// Delete an account unless transactions still reference it. The check runs
/// before any mutation, so a rejected delete leaves the row untouched.
pub fn delete_account(db: &mut Database, id: &str) -> Result<()> {
    let account: Account = from_row(db.get(store::ACCOUNTS, id)?)?;
    let used = db
        .rows(store::TRANSACTIONS)?
        .iter()
        .filter(|row| str_field(row, "account_id") == Some(id))
        .count();
    if used > 0 {
        return Err(MintyError::InUse {
            entity: "Account",
            name: account.name,
            count: used,
        });
    }
    db.delete(store::ACCOUNTS, id)
}

/// Toggle whether the account's transactions count toward overview
/// aggregates. Applied in memory and persisted; a save failure leaves the
/// store resynced to its on-disk state (the flip is reverted).
pub fn set_include_in_overview(db: &mut Database, id: &str, included: bool) -> Result<()> {
    db.update(store::ACCOUNTS, id, |row| {
        row.insert("include_in_overview".into(), json!(included));
    })
}

/// Re-sequence accounts into the given id order. The permutation must cover
/// exactly the existing accounts; afterwards order values are contiguous
/// 1..N. All rows are edited in memory and saved as one batch; if the save
/// fails the table is reloaded from disk to resync.
pub fn reorder_accounts(db: &mut Database, ids: &[String]) -> Result<()> {
    reorder(db, store::ACCOUNTS, ids)
}

/// Shared reorder for any table carrying an `order` column.
pub fn reorder(db: &mut Database, table: &'static str, ids: &[String]) -> Result<()> {
    let rows = db.rows(table)?.to_vec();
    let existing: Vec<&str> = rows.iter().filter_map(|r| str_field(r, "id")).collect();
    if ids.len() != existing.len() || !ids.iter().all(|id| existing.contains(&id.as_str())) {
        return Err(MintyError::Invalid {
            field: "order",
            reason: format!(
                "reorder must list all {} rows of {table} exactly once",
                existing.len()
            ),
        });
    }

    let mut reordered: Vec<Row> = Vec::with_capacity(rows.len());
    for (position, id) in ids.iter().enumerate() {
        let mut row = rows
            .iter()
            .find(|r| str_field(r, "id") == Some(id.as_str()))
            .cloned()
            .ok_or_else(|| MintyError::RowNotFound {
                table: table.to_string(),
                id: id.clone(),
            })?;
        row.insert("order".into(), json!(position as i64 + 1));
        reordered.push(row);
    }

    db.set_rows(table, reordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{mem_db, FlakyStorage};
    use crate::store::i64_field;
    use crate::transactions::add_transaction;

    #[test]
    fn test_add_assigns_contiguous_order() {
        let mut db = mem_db();
        add_account(&mut db, "Checking", "checking", "USD").unwrap();
        add_account(&mut db, "Savings", "savings", "USD").unwrap();
        let accounts = list_accounts(&db).unwrap();
        assert_eq!(accounts[0].order, 1);
        assert_eq!(accounts[1].order, 2);
    }

    #[test]
    fn test_resolve_by_name_case_insensitive() {
        let mut db = mem_db();
        let a = add_account(&mut db, "Checking", "checking", "USD").unwrap();
        assert_eq!(resolve_account(&db, "checking").unwrap().id, a.id);
        assert_eq!(resolve_account(&db, &a.id).unwrap().id, a.id);
        assert!(resolve_account(&db, "nope").is_err());
    }

    #[test]
    fn test_delete_referenced_account_rejected() {
        let mut db = mem_db();
        let a = add_account(&mut db, "Checking", "checking", "USD").unwrap();
        add_transaction(&mut db, &a.id, "2026-01-15", "Groceries", -42.5).unwrap();
        let err = delete_account(&mut db, &a.id).unwrap_err();
        assert!(err.to_string().contains("used in 1 transactions"));
        // no row removed
        assert!(db.find(store::ACCOUNTS, &a.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_unreferenced_account() {
        let mut db = mem_db();
        let a = add_account(&mut db, "Checking", "checking", "USD").unwrap();
        delete_account(&mut db, &a.id).unwrap();
        assert!(db.find(store::ACCOUNTS, &a.id).unwrap().is_none());
    }

    #[test]
    fn test_toggle_overview_flag() {
        let mut db = mem_db();
        let a = add_account(&mut db, "Checking", "checking", "USD").unwrap();
        set_include_in_overview(&mut db, &a.id, false).unwrap();
        let account: Account = from_row(db.get(store::ACCOUNTS, &a.id).unwrap()).unwrap();
        assert!(!account.include_in_overview);
    }

    #[test]
    fn test_toggle_reverted_on_save_failure() {
        let storage = FlakyStorage::reliable();
        let fuse = storage.fuse();
        let mut db = Database::open(Box::new(storage)).unwrap();
        let a = add_account(&mut db, "Checking", "checking", "USD").unwrap();
        fuse.set(0);
        assert!(set_include_in_overview(&mut db, &a.id, false).is_err());
        let account: Account = from_row(db.get(store::ACCOUNTS, &a.id).unwrap()).unwrap();
        assert!(account.include_in_overview, "flag must revert on save failure");
    }

    #[test]
    fn test_reorder_is_contiguous_without_gaps() {
        let mut db = mem_db();
        let a = add_account(&mut db, "A", "checking", "USD").unwrap();
        let b = add_account(&mut db, "B", "checking", "USD").unwrap();
        let c = add_account(&mut db, "C", "checking", "USD").unwrap();
        reorder_accounts(&mut db, &[c.id.clone(), a.id.clone(), b.id.clone()]).unwrap();

        let mut orders: Vec<i64> = db
            .rows(store::ACCOUNTS)
            .unwrap()
            .iter()
            .map(|r| i64_field(r, "order").unwrap())
            .collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(list_accounts(&db).unwrap()[0].name, "C");
    }

    #[test]
    fn test_reorder_rejects_partial_permutation() {
        let mut db = mem_db();
        let a = add_account(&mut db, "A", "checking", "USD").unwrap();
        add_account(&mut db, "B", "checking", "USD").unwrap();
        assert!(reorder_accounts(&mut db, &[a.id.clone()]).is_err());
    }

    #[test]
    fn test_reorder_resyncs_on_save_failure() {
        let storage = FlakyStorage::reliable();
        let fuse = storage.fuse();
        let mut db = Database::open(Box::new(storage)).unwrap();
        let a = add_account(&mut db, "A", "checking", "USD").unwrap();
        let b = add_account(&mut db, "B", "checking", "USD").unwrap();
        fuse.set(0);
        assert!(reorder_accounts(&mut db, &[b.id.clone(), a.id.clone()]).is_err());
        fuse.set(i64::MAX);
        // in-memory order matches the last persisted state
        assert_eq!(list_accounts(&db).unwrap()[0].name, "A");
    }
}
