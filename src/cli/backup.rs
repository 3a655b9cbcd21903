use std::path::Path;

use colored::Colorize;

use crate::backup::{bundle_size, create_backup, verify_backup};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::logger::Logger;
use crate::settings::get_data_dir;

pub fn create() -> Result<()> {
    let mut logger = Logger::open();
    match create_backup(&get_data_dir()) {
        Ok((bundle_dir, manifest)) => {
            let total_rows: usize = manifest.tables.iter().map(|t| t.rows).sum();
            logger.info(format!("backup written to {}", bundle_dir.display()));
            let mut db = crate::cli::open_db()?;
            crate::notify::push(
                &mut db,
                "info",
                &format!("Backup created at {}", bundle_dir.display()),
            )?;
            println!("Backup saved to {}", bundle_dir.display());
            println!(
                "{} tables, {total_rows} rows, {}",
                manifest.tables.len(),
                format_bytes(bundle_size(&bundle_dir))
            );
            Ok(())
        }
        Err(e) => {
            logger.error("backup failed", Some(e.to_string()));
            Err(e)
        }
    }
}

pub fn verify(path: &str) -> Result<()> {
    let mismatched = verify_backup(Path::new(path))?;
    if mismatched.is_empty() {
        println!("{}: all checksums match", "OK".green().bold());
    } else {
        println!(
            "{}: checksum mismatch in {}",
            "FAILED".red().bold(),
            mismatched.join(", ")
        );
        std::process::exit(1);
    }
    Ok(())
}
