use chrono::NaiveDate;
use regex::Regex;
use serde_json::json;

use crate::error::{MintyError, Result};
use crate::migrate::{CanRun, Migration};
use crate::store::{self, str_field, Database};

/// Rewrites transaction dates recorded in legacy formats (MM/DD/YYYY and
/// YYYY/MM/DD) to the ISO YYYY-MM-DD the rest of the app assumes.
pub struct NormalizeTransactionDates;

fn is_iso(date: &str) -> bool {
    // strict shape first; chrono alone accepts 2026-1-5
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap().is_match(date)
        && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

fn normalize(date: &str) -> Option<String> {
    if is_iso(date) {
        return Some(date.to_string());
    }
    for format in ["%m/%d/%Y", "%Y/%m/%d"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(date, format) {
            return Some(parsed.format("%Y-%m-%d").to_string());
        }
    }
    None
}

impl Migration for NormalizeTransactionDates {
    fn name(&self) -> &'static str {
        "normalize_transaction_dates"
    }

    fn version(&self) -> u32 {
        1
    }

    fn affected_tables(&self) -> &'static [&'static str] {
        &[store::TRANSACTIONS]
    }

    fn can_run(&self, db: &Database) -> Result<CanRun> {
        let mut legacy = 0;
        for row in db.rows(store::TRANSACTIONS)? {
            if let Some(date) = str_field(row, "date") {
                if is_iso(date) {
                    continue;
                }
                if normalize(date).is_none() {
                    return Ok(CanRun::no(format!(
                        "date '{date}' matches no known legacy format"
                    )));
                }
                legacy += 1;
            }
        }
        if legacy == 0 {
            return Ok(CanRun::no("all transaction dates are already ISO"));
        }
        Ok(CanRun::yes())
    }

    fn apply(&self, db: &mut Database) -> Result<()> {
        let mut rows = db.rows(store::TRANSACTIONS)?.to_vec();
        for row in rows.iter_mut() {
            let Some(date) = str_field(row, "date").map(str::to_string) else {
                continue;
            };
            let normalized = normalize(&date).ok_or_else(|| MintyError::Invalid {
                field: "date",
                reason: format!("cannot normalize '{date}'"),
            })?;
            row.insert("date".into(), json!(normalized));
        }
        db.set_rows(store::TRANSACTIONS, rows)
    }

    fn verify(&self, db: &Database) -> Result<()> {
        for row in db.rows(store::TRANSACTIONS)? {
            if let Some(date) = str_field(row, "date") {
                if !is_iso(date) {
                    return Err(MintyError::Other(format!(
                        "non-ISO date '{date}' remains"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::run_migration;
    use crate::store::test_support::mem_db;
    use crate::store::Row;

    fn tx_row(id: &str, date: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), json!(id));
        row.insert("account_id".into(), json!("a1"));
        row.insert("date".into(), json!(date));
        row.insert("description".into(), json!("x"));
        row.insert("amount".into(), json!(-1.0));
        row
    }

    #[test]
    fn test_normalizes_legacy_formats() {
        let mut db = mem_db();
        db.insert(store::TRANSACTIONS, tx_row("t1", "01/15/2026")).unwrap();
        db.insert(store::TRANSACTIONS, tx_row("t2", "2026/02/03")).unwrap();
        db.insert(store::TRANSACTIONS, tx_row("t3", "2026-03-04")).unwrap();

        run_migration(&mut db, &NormalizeTransactionDates).unwrap();
        let dates: Vec<&str> = db
            .rows(store::TRANSACTIONS)
            .unwrap()
            .iter()
            .map(|r| str_field(r, "date").unwrap())
            .collect();
        assert_eq!(dates, vec!["2026-01-15", "2026-02-03", "2026-03-04"]);
    }

    #[test]
    fn test_blocked_when_all_iso() {
        let mut db = mem_db();
        db.insert(store::TRANSACTIONS, tx_row("t1", "2026-01-15")).unwrap();
        let gate = NormalizeTransactionDates.can_run(&db).unwrap();
        assert!(!gate.ok);
        assert!(gate.reason.contains("already ISO"));
    }

    #[test]
    fn test_blocked_on_unrecognized_format() {
        let mut db = mem_db();
        db.insert(store::TRANSACTIONS, tx_row("t1", "15 Jan 2026")).unwrap();
        let gate = NormalizeTransactionDates.can_run(&db).unwrap();
        assert!(!gate.ok);
        assert!(gate.reason.contains("no known legacy format"));
    }
}
