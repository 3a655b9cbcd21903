use std::collections::BTreeSet;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::Result;
use crate::store::Row;

/// File name for a table, shared by normal saves, shadow backups and the
/// full-backup bundler so every path writes identical files.
pub fn table_file_name(table: &str) -> String {
    format!("{table}.csv")
}

/// Storage seam for table files. The production impl writes CSV files under
/// the data directory; tests swap in a failing double to exercise revert
/// paths.
pub trait TableFiles {
    fn save_table(&self, table: &str, rows: &[Row]) -> Result<()>;
    fn load_table(&self, table: &str) -> Result<Option<Vec<Row>>>;
    fn table_exists(&self, table: &str) -> bool;
}

/// CSV-file storage rooted at a data directory. One file per table; the
/// header is the sorted union of row keys and each cell holds the JSON
/// encoding of its value (empty cell = key absent). Output is deterministic
/// so a restored table is byte-for-byte identical to its backup.
pub struct DirStorage {
    data_dir: PathBuf,
}

impl DirStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(table_file_name(table))
    }
}

fn encode(rows: &[Row]) -> Result<Vec<u8>> {
    // an empty table has no header either; csv rejects zero-field records
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let mut columns: BTreeSet<String> = BTreeSet::new();
    for row in rows {
        for key in row.keys() {
            columns.insert(key.clone());
        }
    }
    let columns: Vec<String> = columns.into_iter().collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|col| match row.get(col) {
                Some(value) => serde_json::to_string(value).unwrap_or_default(),
                None => String::new(),
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|e| crate::error::MintyError::Other(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Vec<Row>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_reader(bytes);
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (col, cell) in columns.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(cell)?;
            row.insert(col.clone(), value);
        }
        rows.push(row);
    }
    Ok(rows)
}

impl TableFiles for DirStorage {
    fn save_table(&self, table: &str, rows: &[Row]) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let bytes = encode(rows)?;
        std::fs::write(self.table_path(table), bytes)?;
        Ok(())
    }

    fn load_table(&self, table: &str) -> Result<Option<Vec<Row>>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        Ok(Some(decode(&bytes)?))
    }

    fn table_exists(&self, table: &str) -> bool {
        self.table_path(table).exists()
    }
}
