use std::io::Write;
use std::path::PathBuf;

use colored::Colorize;
use rand::Rng;

use crate::cli::open_db;
use crate::error::{MintyError, Result};
use crate::logger::Logger;
use crate::settings::config_dir;
use crate::store;

fn confirmation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| {
            // skip ambiguous characters (0/O, 1/I)
            const CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
            CHARS[rng.gen_range(0..CHARS.len())] as char
        })
        .collect()
}

fn pending_code_path() -> PathBuf {
    config_dir().join("reset_code")
}

/// Wipe every table behind a freshly generated confirmation code. The code
/// can be retyped at the prompt, or the command re-run with `--confirm` and
/// the issued code; any mismatch aborts before a single row is touched.
pub fn run(confirm: Option<&str>) -> Result<()> {
    match confirm {
        Some(code) => confirm_and_wipe(code),
        None => prompt(),
    }
}

fn prompt() -> Result<()> {
    let code = confirmation_code();
    std::fs::create_dir_all(config_dir())?;
    std::fs::write(pending_code_path(), &code)?;

    println!(
        "{} This deletes ALL accounts, transactions, and settings data.",
        "Warning:".red().bold()
    );
    println!("To proceed without the prompt: minty reset --confirm {code}");
    print!("Type {} to confirm (press enter to abort): ", code.bold());
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        println!("Nothing deleted. The code above stays valid for --confirm.");
        return Ok(());
    }
    if input != code {
        let _ = std::fs::remove_file(pending_code_path());
        return Err(MintyError::ConfirmationMismatch);
    }
    wipe()
}

fn confirm_and_wipe(code: &str) -> Result<()> {
    let pending = std::fs::read_to_string(pending_code_path())
        .ok()
        .map(|s| s.trim().to_string());
    if pending.as_deref() != Some(code) {
        let _ = std::fs::remove_file(pending_code_path());
        return Err(MintyError::ConfirmationMismatch);
    }
    wipe()
}

fn wipe() -> Result<()> {
    let mut db = open_db()?;
    for table in store::TABLES {
        db.set_rows(table, Vec::new())?;
    }
    let _ = std::fs::remove_file(pending_code_path());
    Logger::open().warn("all data reset by user");
    println!("All data deleted.");
    Ok(())
}
