use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::logger::Logger;

pub fn show(limit: usize) -> Result<()> {
    let logger = Logger::open();
    let entries = logger.entries();
    let start = entries.len().saturating_sub(limit);

    let mut table = Table::new();
    table.set_header(vec!["When", "Level", "Message", "Context"]);
    for entry in &entries[start..] {
        table.add_row(vec![
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(entry.level),
            Cell::new(&entry.message),
            Cell::new(entry.context.as_deref().unwrap_or("")),
        ]);
    }
    println!("Log ({} of {} entries)\n{table}", entries.len() - start, entries.len());
    Ok(())
}

pub fn clear() -> Result<()> {
    let mut logger = Logger::open();
    logger.clear()?;
    println!("Log cleared");
    Ok(())
}
