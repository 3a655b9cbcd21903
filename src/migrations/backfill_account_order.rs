use serde_json::json;

use crate::error::{MintyError, Result};
use crate::migrate::{CanRun, Migration};
use crate::store::{self, i64_field, Database};

/// Early account rows predate the `order` column. This assigns contiguous
/// 1..N order values in current row sequence to any table state where orders
/// are missing, duplicated or gapped.
pub struct BackfillAccountOrder;

fn orders_are_contiguous(db: &Database) -> Result<bool> {
    let mut orders: Vec<i64> = Vec::new();
    for row in db.rows(store::ACCOUNTS)? {
        match i64_field(row, "order") {
            Some(n) => orders.push(n),
            None => return Ok(false),
        }
    }
    orders.sort_unstable();
    Ok(orders.iter().enumerate().all(|(i, n)| *n == i as i64 + 1))
}

impl Migration for BackfillAccountOrder {
    fn name(&self) -> &'static str {
        "backfill_account_order"
    }

    fn version(&self) -> u32 {
        1
    }

    fn affected_tables(&self) -> &'static [&'static str] {
        &[store::ACCOUNTS]
    }

    fn can_run(&self, db: &Database) -> Result<CanRun> {
        if db.rows(store::ACCOUNTS)?.is_empty() {
            return Ok(CanRun::no("no accounts to backfill"));
        }
        if orders_are_contiguous(db)? {
            return Ok(CanRun::no("account order values are already contiguous"));
        }
        Ok(CanRun::yes())
    }

    fn apply(&self, db: &mut Database) -> Result<()> {
        let mut rows = db.rows(store::ACCOUNTS)?.to_vec();
        for (i, row) in rows.iter_mut().enumerate() {
            row.insert("order".into(), json!(i as i64 + 1));
        }
        db.set_rows(store::ACCOUNTS, rows)
    }

    fn verify(&self, db: &Database) -> Result<()> {
        if !orders_are_contiguous(db)? {
            return Err(MintyError::Other(
                "account order values are not contiguous after backfill".to_string(),
            ));
        }
        Ok(())
    }
}
