use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{MintyError, Result};
use crate::files::table_file_name;
use crate::store;

#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub created_at: String,
    pub app_version: String,
    pub tables: Vec<TableEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TableEntry {
    pub name: String,
    pub file: String,
    pub rows: usize,
    pub sha256: String,
}

/// Bundle every table file plus a manifest into a date-stamped directory
/// under `<data_dir>/backups/`. Missing table files (tables never saved)
/// are recorded with zero rows and skipped from the copy.
pub fn create_backup(data_dir: &Path) -> Result<(PathBuf, Manifest)> {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let bundle_dir = data_dir.join("backups").join(format!("minty-{stamp}"));
    std::fs::create_dir_all(&bundle_dir)?;

    let mut tables = Vec::new();
    for table in store::TABLES {
        let file = table_file_name(table);
        let source = data_dir.join(&file);
        if !source.exists() {
            tables.push(TableEntry {
                name: table.to_string(),
                file,
                rows: 0,
                sha256: String::new(),
            });
            continue;
        }
        let bytes = std::fs::read(&source)?;
        std::fs::write(bundle_dir.join(&file), &bytes)?;
        tables.push(TableEntry {
            name: table.to_string(),
            file,
            rows: count_rows(&bytes),
            sha256: hex::encode(Sha256::digest(&bytes)),
        });
    }

    let manifest = Manifest {
        created_at: chrono::Utc::now().to_rfc3339(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        tables,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(bundle_dir.join("manifest.json"), format!("{json}\n"))?;
    Ok((bundle_dir, manifest))
}

/// Verify a bundle's files against its manifest. Returns the names of
/// tables whose checksum no longer matches.
pub fn verify_backup(bundle_dir: &Path) -> Result<Vec<String>> {
    let manifest_path = bundle_dir.join("manifest.json");
    let content = std::fs::read_to_string(&manifest_path).map_err(|_| {
        MintyError::Other(format!("no manifest.json in {}", bundle_dir.display()))
    })?;
    let manifest: Manifest = serde_json::from_str(&content)?;

    let mut mismatched = Vec::new();
    for entry in &manifest.tables {
        if entry.sha256.is_empty() {
            continue;
        }
        let path = bundle_dir.join(&entry.file);
        let ok = std::fs::read(&path)
            .map(|bytes| hex::encode(Sha256::digest(&bytes)) == entry.sha256)
            .unwrap_or(false);
        if !ok {
            mismatched.push(entry.name.clone());
        }
    }
    Ok(mismatched)
}

fn count_rows(csv_bytes: &[u8]) -> usize {
    let mut reader = csv::Reader::from_reader(csv_bytes);
    reader.records().filter(|r| r.is_ok()).count()
}

pub fn bundle_size(bundle_dir: &Path) -> u64 {
    std::fs::read_dir(bundle_dir)
        .map(|entries| {
            entries
                .flatten()
                .filter_map(|e| e.metadata().ok())
                .map(|m| m.len())
                .sum()
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::add_account;
    use crate::files::DirStorage;
    use crate::store::Database;

    fn seeded_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open(Box::new(DirStorage::new(dir.path()))).unwrap();
        add_account(&mut db, "Checking", "checking", "USD").unwrap();
        dir
    }

    #[test]
    fn test_backup_copies_files_and_writes_manifest() {
        let dir = seeded_dir();
        let (bundle_dir, manifest) = create_backup(dir.path()).unwrap();
        assert!(bundle_dir.join("manifest.json").exists());
        assert!(bundle_dir.join("accounts.csv").exists());

        let accounts = manifest
            .tables
            .iter()
            .find(|t| t.name == "accounts")
            .unwrap();
        assert_eq!(accounts.rows, 1);
        assert!(!accounts.sha256.is_empty());
        // tables never saved are manifest-only entries
        let migrations = manifest
            .tables
            .iter()
            .find(|t| t.name == "migrations")
            .unwrap();
        assert_eq!(migrations.rows, 0);
    }

    #[test]
    fn test_verify_detects_tampering() {
        let dir = seeded_dir();
        let (bundle_dir, _) = create_backup(dir.path()).unwrap();
        assert!(verify_backup(&bundle_dir).unwrap().is_empty());

        std::fs::write(bundle_dir.join("accounts.csv"), b"corrupted").unwrap();
        assert_eq!(verify_backup(&bundle_dir).unwrap(), vec!["accounts"]);
    }

    #[test]
    fn test_manifest_covers_all_tables() {
        let dir = seeded_dir();
        let (_, manifest) = create_backup(dir.path()).unwrap();
        assert_eq!(manifest.tables.len(), store::TABLES.len());
    }
}
