use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::models::{from_row, to_row, Notification};
use crate::store::{self, Database};

pub fn push(db: &mut Database, level: &str, message: &str) -> Result<Notification> {
    let notification = Notification {
        id: store::new_id(),
        created_at: Utc::now().to_rfc3339(),
        level: level.to_string(),
        message: message.to_string(),
        read: false,
    };
    db.insert(store::NOTIFICATIONS, to_row(&notification)?)?;
    Ok(notification)
}

pub fn list(db: &Database, unread_only: bool) -> Result<Vec<Notification>> {
    let mut items: Vec<Notification> = db
        .rows(store::NOTIFICATIONS)?
        .iter()
        .map(from_row)
        .collect::<Result<_>>()?;
    if unread_only {
        items.retain(|n| !n.read);
    }
    // newest first
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(items)
}

pub fn mark_read(db: &mut Database, id: &str) -> Result<()> {
    db.update(store::NOTIFICATIONS, id, |row| {
        row.insert("read".into(), json!(true));
    })
}

pub fn clear(db: &mut Database) -> Result<()> {
    db.set_rows(store::NOTIFICATIONS, Vec::new())
}
