use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::store::Row;

/// Typed views over the loosely-typed table rows. Missing keys fall back to
/// defaults rather than failing, matching how rows accrete fields over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default = "default_true")]
    pub include_in_overview: bool,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub subcategory_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// External statement reference; present when reconciled.
    #[serde(default)]
    pub statement_ref: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn is_reconciled(&self) -> bool {
        self.statement_ref.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionGroup {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub id: String,
    pub code: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub created_at: String,
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub name: String,
    pub version: u32,
    pub applied_at: String,
    pub backup_suffix: String,
}

fn default_true() -> bool {
    true
}

fn default_decimals() -> u32 {
    2
}

pub fn to_row<T: Serialize>(model: &T) -> Result<Row> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(map),
        other => Err(crate::error::MintyError::Other(format!(
            "model did not serialize to an object: {other}"
        ))),
    }
}

pub fn from_row<T: for<'de> Deserialize<'de>>(row: &Row) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(row.clone()))?)
}
