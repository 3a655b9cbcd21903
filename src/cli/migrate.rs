use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::logger::Logger;
use crate::migrate::{find_record, is_applied, rollback_migration, run_migration};
use crate::migrations::{all_migrations, find_migration};

pub fn list() -> Result<()> {
    let db = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["Name", "Version", "Status", "Can Run"]);
    for migration in all_migrations() {
        let applied = is_applied(&db, migration.as_ref())?;
        let status = if applied {
            let record = find_record(&db, migration.name())?;
            format!(
                "applied (backup {})",
                record.map(|r| r.backup_suffix).unwrap_or_default()
            )
        } else {
            "not applied".to_string()
        };
        let gate = migration.can_run(&db)?;
        let can_run = if applied {
            String::new()
        } else if gate.ok {
            "yes".to_string()
        } else {
            gate.reason
        };
        table.add_row(vec![
            Cell::new(migration.name()),
            Cell::new(migration.version()),
            Cell::new(status),
            Cell::new(can_run),
        ]);
    }
    println!("Migrations\n{table}");
    Ok(())
}

pub fn run(name: &str) -> Result<()> {
    let mut db = open_db()?;
    let mut logger = Logger::open();
    let migration = find_migration(name)?;

    match run_migration(&mut db, migration.as_ref()) {
        Ok(outcome) if outcome.already_applied => {
            println!("{name} was already applied; nothing to do");
            Ok(())
        }
        Ok(outcome) => {
            let suffix = outcome.backup_suffix.unwrap_or_default();
            logger.info(format!("migration {name} applied (backup {suffix})"));
            crate::notify::push(&mut db, "info", &format!("Migration {name} applied"))?;
            println!("{} {name}", "Applied".green().bold());
            println!("Backup suffix: {suffix} (needed for rollback)");
            Ok(())
        }
        Err(e) => {
            logger.error(format!("migration {name} failed"), Some(e.to_string()));
            Err(e)
        }
    }
}

pub fn rollback(name: &str, suffix: &str) -> Result<()> {
    let mut db = open_db()?;
    let mut logger = Logger::open();
    let migration = find_migration(name)?;

    match rollback_migration(&mut db, migration.as_ref(), suffix) {
        Ok(()) => {
            logger.info(format!("migration {name} rolled back from backup {suffix}"));
            println!("{} {name} from backup {suffix}", "Rolled back".green().bold());
            Ok(())
        }
        Err(e) => {
            logger.error(format!("rollback of {name} failed"), Some(e.to_string()));
            Err(e)
        }
    }
}
