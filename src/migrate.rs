use chrono::Utc;

use crate::error::{MintyError, Result};
use crate::models::{from_row, to_row, MigrationRecord};
use crate::store::{self, str_field, Database};

/// Result of a precondition check. `reason` explains a false `ok` in terms a
/// user can act on; the check itself never mutates anything.
pub struct CanRun {
    pub ok: bool,
    pub reason: String,
}

impl CanRun {
    pub fn yes() -> Self {
        Self {
            ok: true,
            reason: String::new(),
        }
    }

    pub fn no(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: reason.into(),
        }
    }
}

/// A one-time, reversible scripted edit to one or more tables. Each instance
/// owns only its edit and its post-condition; backup, idempotence, history
/// recording and rollback live in the runner.
pub trait Migration {
    fn name(&self) -> &'static str;
    fn version(&self) -> u32;
    /// Tables the edit touches; exactly these are shadow-copied beforehand
    /// and restored on rollback.
    fn affected_tables(&self) -> &'static [&'static str];
    /// Inspect current state for preconditions. No side effects.
    fn can_run(&self, db: &Database) -> Result<CanRun>;
    /// The scripted edit. Persists through normal Database operations.
    fn apply(&self, db: &mut Database) -> Result<()>;
    /// Post-condition check, run against freshly re-read tables.
    fn verify(&self, db: &Database) -> Result<()>;
}

#[derive(Debug)]
pub struct RunOutcome {
    pub already_applied: bool,
    /// Backup identifier needed for rollback; None when already applied.
    pub backup_suffix: Option<String>,
}

pub fn shadow_table_name(table: &str, suffix: &str) -> String {
    format!("{table}__backup_{suffix}")
}

pub fn find_record(db: &Database, name: &str) -> Result<Option<MigrationRecord>> {
    for row in db.rows(store::MIGRATIONS)? {
        if str_field(row, "name") == Some(name) {
            return Ok(Some(from_row(row)?));
        }
    }
    Ok(None)
}

pub fn is_applied(db: &Database, migration: &dyn Migration) -> Result<bool> {
    Ok(find_record(db, migration.name())?
        .map(|r| r.version == migration.version())
        .unwrap_or(false))
}

/// Copy every affected table into a timestamp-suffixed shadow table,
/// persisted through the same save path as normal tables. Returns the
/// suffix. Any failure aborts before the migration mutates anything.
fn create_backup(db: &mut Database, migration: &dyn Migration) -> Result<String> {
    let suffix = Utc::now().format("%Y%m%d%H%M%S%3f").to_string();
    for table in migration.affected_tables() {
        let rows = db.rows(table)?.to_vec();
        db.write_table(&shadow_table_name(table, &suffix), rows)?;
    }
    Ok(suffix)
}

/// Run a migration end to end: idempotence check, precondition check,
/// backup, scripted edit, post-condition validation against re-read tables,
/// then the history record. Errors propagate as failures and are never
/// retried; the shadow tables are left in place for manual recovery.
pub fn run_migration(db: &mut Database, migration: &dyn Migration) -> Result<RunOutcome> {
    if is_applied(db, migration)? {
        return Ok(RunOutcome {
            already_applied: true,
            backup_suffix: None,
        });
    }

    let gate = migration.can_run(db)?;
    if !gate.ok {
        return Err(MintyError::PreconditionFailed {
            name: migration.name().to_string(),
            reason: gate.reason,
        });
    }

    let suffix = create_backup(db, migration)?;

    migration.apply(db)?;

    // validate against what actually hit the files, not in-memory state
    for table in migration.affected_tables() {
        db.reload(table)?;
    }
    migration.verify(db).map_err(|e| MintyError::ValidationFailed {
        name: migration.name().to_string(),
        reason: e.to_string(),
    })?;

    let record = MigrationRecord {
        name: migration.name().to_string(),
        version: migration.version(),
        applied_at: Utc::now().to_rfc3339(),
        backup_suffix: suffix.clone(),
    };
    db.insert(store::MIGRATIONS, to_row(&record)?)?;

    Ok(RunOutcome {
        already_applied: false,
        backup_suffix: Some(suffix),
    })
}

/// Restore every affected table from its shadow copy and drop the history
/// record. The caller supplies the suffix returned by the original run; a
/// missing shadow table is a hard error and nothing is restored past it.
pub fn rollback_migration(
    db: &mut Database,
    migration: &dyn Migration,
    suffix: &str,
) -> Result<()> {
    // check all shadows exist before touching any table
    let mut restored = Vec::new();
    for table in migration.affected_tables() {
        let shadow = shadow_table_name(table, suffix);
        let rows = db
            .read_table(&shadow)?
            .ok_or(MintyError::MissingBackup(shadow))?;
        restored.push((*table, rows));
    }
    for (table, rows) in restored {
        db.set_rows(table, rows)?;
    }

    let remaining: Vec<_> = db
        .rows(store::MIGRATIONS)?
        .iter()
        .filter(|row| str_field(row, "name") != Some(migration.name()))
        .cloned()
        .collect();
    db.set_rows(store::MIGRATIONS, remaining)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::DirStorage;
    use crate::store::test_support::mem_db;
    use crate::store::Row;
    use serde_json::json;

    /// Inserts a fixed marker row into the tags table.
    struct AddMarkerTag;

    impl Migration for AddMarkerTag {
        fn name(&self) -> &'static str {
            "add_marker_tag"
        }

        fn version(&self) -> u32 {
            1
        }

        fn affected_tables(&self) -> &'static [&'static str] {
            &[store::TAGS]
        }

        fn can_run(&self, db: &Database) -> Result<CanRun> {
            let exists = db
                .rows(store::TAGS)?
                .iter()
                .any(|row| str_field(row, "name") == Some("marker"));
            if exists {
                Ok(CanRun::no("tag 'marker' already exists"))
            } else {
                Ok(CanRun::yes())
            }
        }

        fn apply(&self, db: &mut Database) -> Result<()> {
            let mut row = Row::new();
            row.insert("id".into(), json!("marker01"));
            row.insert("name".into(), json!("marker"));
            row.insert("order".into(), json!(1));
            db.insert(store::TAGS, row)
        }

        fn verify(&self, db: &Database) -> Result<()> {
            if db.find(store::TAGS, "marker01")?.is_none() {
                return Err(MintyError::Other("marker tag missing".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_run_records_history_and_backup_suffix() {
        let mut db = mem_db();
        let outcome = run_migration(&mut db, &AddMarkerTag).unwrap();
        assert!(!outcome.already_applied);
        let suffix = outcome.backup_suffix.unwrap();
        let record = find_record(&db, "add_marker_tag").unwrap().unwrap();
        assert_eq!(record.version, 1);
        assert_eq!(record.backup_suffix, suffix);
        // shadow persisted through the normal save path
        assert!(db
            .read_table(&shadow_table_name(store::TAGS, &suffix))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_second_run_is_noop() {
        let mut db = mem_db();
        run_migration(&mut db, &AddMarkerTag).unwrap();
        let rows_before = db.rows(store::TAGS).unwrap().to_vec();

        let second = run_migration(&mut db, &AddMarkerTag).unwrap();
        assert!(second.already_applied);
        assert!(second.backup_suffix.is_none());
        assert_eq!(db.rows(store::TAGS).unwrap(), rows_before.as_slice());
    }

    #[test]
    fn test_precondition_failure_reports_reason() {
        let mut db = mem_db();
        let mut row = Row::new();
        row.insert("id".into(), json!("x"));
        row.insert("name".into(), json!("marker"));
        db.insert(store::TAGS, row).unwrap();

        let err = run_migration(&mut db, &AddMarkerTag).unwrap_err();
        match err {
            MintyError::PreconditionFailed { reason, .. } => {
                assert!(reason.contains("already exists"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // precondition check has no side effects
        assert!(find_record(&db, "add_marker_tag").unwrap().is_none());
    }

    #[test]
    fn test_rollback_restores_files_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open(Box::new(DirStorage::new(dir.path()))).unwrap();
        let mut row = Row::new();
        row.insert("id".into(), json!("t1"));
        row.insert("name".into(), json!("existing"));
        row.insert("order".into(), json!(1));
        db.insert(store::TAGS, row).unwrap();

        let table_path = dir.path().join("tags.csv");
        let before = std::fs::read(&table_path).unwrap();

        let outcome = run_migration(&mut db, &AddMarkerTag).unwrap();
        let suffix = outcome.backup_suffix.unwrap();
        assert_ne!(std::fs::read(&table_path).unwrap(), before);

        rollback_migration(&mut db, &AddMarkerTag, &suffix).unwrap();
        assert_eq!(std::fs::read(&table_path).unwrap(), before);
        assert!(find_record(&db, "add_marker_tag").unwrap().is_none());
        // run again after rollback: back to not-applied
        assert!(!run_migration(&mut db, &AddMarkerTag).unwrap().already_applied);
    }

    #[test]
    fn test_rollback_missing_shadow_fails_loudly() {
        let mut db = mem_db();
        run_migration(&mut db, &AddMarkerTag).unwrap();
        let err = rollback_migration(&mut db, &AddMarkerTag, "19990101000000000").unwrap_err();
        assert!(matches!(err, MintyError::MissingBackup(_)));
    }

    #[test]
    fn test_backup_failure_aborts_before_mutation() {
        use crate::store::test_support::FlakyStorage;
        let storage = FlakyStorage::reliable();
        let fuse = storage.fuse();
        let mut db = Database::open(Box::new(storage)).unwrap();
        fuse.set(0);
        assert!(run_migration(&mut db, &AddMarkerTag).is_err());
        fuse.set(i64::MAX);
        assert!(db.find(store::TAGS, "marker01").unwrap().is_none());
        assert!(find_record(&db, "add_marker_tag").unwrap().is_none());
    }
}
