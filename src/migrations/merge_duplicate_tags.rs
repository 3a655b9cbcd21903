use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::error::{MintyError, Result};
use crate::migrate::{CanRun, Migration};
use crate::store::{self, str_field, Database};

/// Collapses tags whose names differ only by case into the first-created
/// row, re-pointing transaction tag_ids at the survivor.
pub struct MergeDuplicateTags;

/// lowercased name -> ids in row order; first id is the survivor.
fn tag_groups(db: &Database) -> Result<BTreeMap<String, Vec<String>>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in db.rows(store::TAGS)? {
        if let (Some(id), Some(name)) = (str_field(row, "id"), str_field(row, "name")) {
            groups
                .entry(name.to_lowercase())
                .or_default()
                .push(id.to_string());
        }
    }
    Ok(groups)
}

impl Migration for MergeDuplicateTags {
    fn name(&self) -> &'static str {
        "merge_duplicate_tags"
    }

    fn version(&self) -> u32 {
        1
    }

    fn affected_tables(&self) -> &'static [&'static str] {
        &[store::TAGS, store::TRANSACTIONS]
    }

    fn can_run(&self, db: &Database) -> Result<CanRun> {
        if tag_groups(db)?.values().any(|ids| ids.len() > 1) {
            Ok(CanRun::yes())
        } else {
            Ok(CanRun::no("no duplicate tag names found"))
        }
    }

    fn apply(&self, db: &mut Database) -> Result<()> {
        let groups = tag_groups(db)?;
        // losing id -> surviving id
        let mut remap: BTreeMap<String, String> = BTreeMap::new();
        for ids in groups.values() {
            for id in ids.iter().skip(1) {
                remap.insert(id.clone(), ids[0].clone());
            }
        }

        let mut transactions = db.rows(store::TRANSACTIONS)?.to_vec();
        for row in transactions.iter_mut() {
            let Some(Value::Array(tag_ids)) = row.get("tag_ids").cloned() else {
                continue;
            };
            let mut seen = Vec::new();
            for value in tag_ids {
                let Some(id) = value.as_str() else { continue };
                let target = remap.get(id).map(String::as_str).unwrap_or(id);
                if !seen.iter().any(|s| s == target) {
                    seen.push(target.to_string());
                }
            }
            row.insert("tag_ids".into(), json!(seen));
        }
        db.set_rows(store::TRANSACTIONS, transactions)?;

        let survivors: Vec<_> = db
            .rows(store::TAGS)?
            .iter()
            .filter(|row| {
                str_field(row, "id")
                    .map(|id| !remap.contains_key(id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        db.set_rows(store::TAGS, survivors)
    }

    fn verify(&self, db: &Database) -> Result<()> {
        if tag_groups(db)?.values().any(|ids| ids.len() > 1) {
            return Err(MintyError::Other(
                "duplicate tag names remain after merge".to_string(),
            ));
        }
        // no transaction may reference a deleted tag
        let live: Vec<String> = db
            .rows(store::TAGS)?
            .iter()
            .filter_map(|row| str_field(row, "id").map(str::to_string))
            .collect();
        for row in db.rows(store::TRANSACTIONS)? {
            if let Some(Value::Array(tag_ids)) = row.get("tag_ids") {
                for value in tag_ids {
                    if let Some(id) = value.as_str() {
                        if !live.iter().any(|l| l == id) {
                            return Err(MintyError::Other(format!(
                                "transaction references deleted tag {id}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::add_account;
    use crate::categories::add_tag;
    use crate::migrate::run_migration;
    use crate::store::test_support::mem_db;
    use crate::store::Row;
    use crate::transactions::add_transaction;

    fn tag_row(id: &str, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), json!(id));
        row.insert("name".into(), json!(name));
        row
    }

    #[test]
    fn test_merges_and_repoints_transactions() {
        let mut db = mem_db();
        let account = add_account(&mut db, "Checking", "checking", "USD").unwrap();
        // add_tag rejects duplicates, so build the legacy state directly
        db.insert(store::TAGS, tag_row("t1", "Travel")).unwrap();
        db.insert(store::TAGS, tag_row("t2", "travel")).unwrap();
        let tx = add_transaction(&mut db, &account.id, "2026-01-15", "x", -5.0).unwrap();
        db.update(store::TRANSACTIONS, &tx.id, |row| {
            row.insert("tag_ids".into(), json!(["t2", "t1"]));
        })
        .unwrap();

        run_migration(&mut db, &MergeDuplicateTags).unwrap();

        assert_eq!(db.rows(store::TAGS).unwrap().len(), 1);
        let row = db.get(store::TRANSACTIONS, &tx.id).unwrap();
        assert_eq!(row.get("tag_ids").unwrap(), &json!(["t1"]));
    }

    #[test]
    fn test_blocked_without_duplicates() {
        let mut db = mem_db();
        add_tag(&mut db, "travel").unwrap();
        add_tag(&mut db, "food").unwrap();
        let gate = MergeDuplicateTags.can_run(&db).unwrap();
        assert!(!gate.ok);
        assert!(gate.reason.contains("no duplicate"));
    }
}
