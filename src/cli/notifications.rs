use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::notify;

pub fn list(unread_only: bool) -> Result<()> {
    let db = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "When", "Level", "Message", "Read"]);
    for n in notify::list(&db, unread_only)? {
        table.add_row(vec![
            Cell::new(&n.id),
            Cell::new(&n.created_at),
            Cell::new(&n.level),
            Cell::new(&n.message),
            Cell::new(if n.read { "yes" } else { "" }),
        ]);
    }
    println!("Notifications\n{table}");
    Ok(())
}

pub fn mark_read(id: &str) -> Result<()> {
    let mut db = open_db()?;
    notify::mark_read(&mut db, id)?;
    println!("Marked {id} as read");
    Ok(())
}

pub fn clear() -> Result<()> {
    let mut db = open_db()?;
    notify::clear(&mut db)?;
    println!("Cleared notifications");
    Ok(())
}
