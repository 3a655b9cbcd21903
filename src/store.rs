use std::collections::BTreeMap;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;

use crate::error::{MintyError, Result};
use crate::files::TableFiles;

/// A loosely-typed record: key/value pairs with no enforced schema.
pub type Row = serde_json::Map<String, Value>;

pub const ACCOUNTS: &str = "accounts";
pub const TRANSACTIONS: &str = "transactions";
pub const CATEGORIES: &str = "categories";
pub const SUBCATEGORIES: &str = "subcategories";
pub const TRANSACTION_GROUPS: &str = "transaction_groups";
pub const CURRENCIES: &str = "currencies";
pub const TAGS: &str = "tags";
pub const MIGRATIONS: &str = "migrations";
pub const NOTIFICATIONS: &str = "notifications";
pub const USER_PREFERENCES: &str = "user_preferences";

/// Every table the store mirrors to a file. Shadow backup tables are created
/// on demand and are not listed here.
pub const TABLES: &[&str] = &[
    ACCOUNTS,
    TRANSACTIONS,
    CATEGORIES,
    SUBCATEGORIES,
    TRANSACTION_GROUPS,
    CURRENCIES,
    TAGS,
    MIGRATIONS,
    NOTIFICATIONS,
    USER_PREFERENCES,
];

/// In-memory table store mirrored to spreadsheet-style files. Tables are
/// ordered sequences of rows; relationships are informal string-id foreign
/// keys checked at operation time, not enforced by the store.
pub struct Database {
    storage: Box<dyn TableFiles>,
    tables: BTreeMap<String, Vec<Row>>,
}

impl Database {
    /// Open the store, loading every known table (missing files load empty).
    pub fn open(storage: Box<dyn TableFiles>) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for name in TABLES {
            let rows = storage.load_table(name)?.unwrap_or_default();
            tables.insert(name.to_string(), rows);
        }
        Ok(Self { storage, tables })
    }

    pub fn rows(&self, table: &str) -> Result<&[Row]> {
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| MintyError::UnknownTable(table.to_string()))
    }

    pub fn find(&self, table: &str, id: &str) -> Result<Option<&Row>> {
        Ok(self
            .rows(table)?
            .iter()
            .find(|row| str_field(row, "id") == Some(id)))
    }

    pub fn get(&self, table: &str, id: &str) -> Result<&Row> {
        self.find(table, id)?.ok_or_else(|| MintyError::RowNotFound {
            table: table.to_string(),
            id: id.to_string(),
        })
    }

    /// Append a row and persist the table. On save failure the table is
    /// reloaded, so the rejected row does not linger in memory.
    pub fn insert(&mut self, table: &str, row: Row) -> Result<()> {
        self.table_mut(table)?.push(row);
        self.save_or_reload(table)
    }

    /// Apply an edit to the row with the given id and persist. The edit is
    /// applied in memory first; a save failure propagates after the table
    /// has been reloaded from disk, so memory never drifts from the files.
    pub fn update<F>(&mut self, table: &str, id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Row),
    {
        let rows = self.table_mut(table)?;
        let row = rows
            .iter_mut()
            .find(|row| str_field(row, "id") == Some(id))
            .ok_or_else(|| MintyError::RowNotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;
        edit(row);
        self.save_or_reload(table)
    }

    /// Remove the row with the given id and persist.
    pub fn delete(&mut self, table: &str, id: &str) -> Result<()> {
        let rows = self.table_mut(table)?;
        let before = rows.len();
        rows.retain(|row| str_field(row, "id") != Some(id));
        if rows.len() == before {
            return Err(MintyError::RowNotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        self.save_or_reload(table)
    }

    /// Replace a table's contents wholesale and persist, reloading from
    /// disk if the save fails.
    pub fn set_rows(&mut self, table: &str, rows: Vec<Row>) -> Result<()> {
        self.tables.insert(table.to_string(), rows);
        self.save_or_reload(table)
    }

    /// Write an arbitrary (e.g. shadow backup) table through the same save
    /// path as normal tables.
    pub fn write_table(&mut self, table: &str, rows: Vec<Row>) -> Result<()> {
        self.storage.save_table(table, &rows)?;
        self.tables.insert(table.to_string(), rows);
        Ok(())
    }

    /// Load a table that is not part of the standard set (shadow backups).
    pub fn read_table(&self, table: &str) -> Result<Option<Vec<Row>>> {
        if let Some(rows) = self.tables.get(table) {
            return Ok(Some(rows.clone()));
        }
        if !self.storage.table_exists(table) {
            return Ok(None);
        }
        self.storage.load_table(table)
    }

    pub fn save(&mut self, table: &str) -> Result<()> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| MintyError::UnknownTable(table.to_string()))?;
        self.storage.save_table(table, rows)
    }

    /// Re-read a table from its file, discarding in-memory state. Used to
    /// resync after a failed batched save.
    pub fn reload(&mut self, table: &str) -> Result<()> {
        let rows = self.storage.load_table(table)?.unwrap_or_default();
        self.tables.insert(table.to_string(), rows);
        Ok(())
    }

    fn save_or_reload(&mut self, table: &str) -> Result<()> {
        if let Err(e) = self.save(table) {
            self.reload(table)?;
            return Err(e);
        }
        Ok(())
    }

    fn table_mut(&mut self, table: &str) -> Result<&mut Vec<Row>> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| MintyError::UnknownTable(table.to_string()))
    }
}

/// Random 8-character lowercase alphanumeric row id.
pub fn new_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}

pub fn str_field<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

pub fn i64_field(row: &Row, key: &str) -> Option<i64> {
    row.get(key).and_then(Value::as_i64)
}


#[cfg(test)]
mod tests {
    use super::test_support::{mem_db, FlakyStorage};
    use super::*;
    use serde_json::json;

    fn account_row(id: &str, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), json!(id));
        row.insert("name".into(), json!(name));
        row
    }

    #[test]
    fn test_open_loads_all_tables_empty() {
        let db = mem_db();
        for table in TABLES {
            assert!(db.rows(table).unwrap().is_empty());
        }
    }

    #[test]
    fn test_insert_find_delete() {
        let mut db = mem_db();
        db.insert(ACCOUNTS, account_row("a1", "Checking")).unwrap();
        assert_eq!(
            str_field(db.get(ACCOUNTS, "a1").unwrap(), "name"),
            Some("Checking")
        );
        db.delete(ACCOUNTS, "a1").unwrap();
        assert!(db.find(ACCOUNTS, "a1").unwrap().is_none());
    }

    #[test]
    fn test_update_edits_in_place() {
        let mut db = mem_db();
        db.insert(ACCOUNTS, account_row("a1", "Checking")).unwrap();
        db.update(ACCOUNTS, "a1", |row| {
            row.insert("name".into(), json!("Joint Checking"));
        })
        .unwrap();
        assert_eq!(
            str_field(db.get(ACCOUNTS, "a1").unwrap(), "name"),
            Some("Joint Checking")
        );
    }

    #[test]
    fn test_unknown_table_rejected() {
        let db = mem_db();
        assert!(matches!(
            db.rows("bogus"),
            Err(MintyError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_update_reverts_memory_on_save_failure() {
        let storage = FlakyStorage::failing_after(1);
        let mut db = Database::open(Box::new(storage)).unwrap();
        db.insert(ACCOUNTS, account_row("a1", "Checking")).unwrap();
        let err = db.update(ACCOUNTS, "a1", |row| {
            row.insert("name".into(), json!("Renamed"));
        });
        assert!(err.is_err());
        // memory resynced from the last persisted state
        assert_eq!(
            str_field(db.get(ACCOUNTS, "a1").unwrap(), "name"),
            Some("Checking")
        );
    }

    #[test]
    fn test_insert_reverts_memory_on_save_failure() {
        let storage = FlakyStorage::failing_after(1);
        let mut db = Database::open(Box::new(storage)).unwrap();
        db.insert(ACCOUNTS, account_row("a1", "Checking")).unwrap();
        assert!(db.insert(ACCOUNTS, account_row("a2", "Savings")).is_err());
        // the rejected row must not linger in memory
        assert_eq!(db.rows(ACCOUNTS).unwrap().len(), 1);
        assert!(db.find(ACCOUNTS, "a2").unwrap().is_none());
    }

    #[test]
    fn test_set_rows_reverts_memory_on_save_failure() {
        let storage = FlakyStorage::failing_after(1);
        let mut db = Database::open(Box::new(storage)).unwrap();
        db.insert(ACCOUNTS, account_row("a1", "Checking")).unwrap();
        assert!(db.set_rows(ACCOUNTS, Vec::new()).is_err());
        assert_eq!(db.rows(ACCOUNTS).unwrap().len(), 1);
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn test_write_and_read_shadow_table() {
        let mut db = mem_db();
        db.write_table("accounts__backup_20260101000000", vec![account_row("a1", "X")])
            .unwrap();
        let rows = db
            .read_table("accounts__backup_20260101000000")
            .unwrap()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(db.read_table("accounts__backup_nope").unwrap(), None);
    }
}
