use colored::Colorize;

use crate::categories::{add_category, add_subcategory};
use crate::cli::open_db;
use crate::currencies::seed_currencies;
use crate::error::Result;
use crate::prefs::mirror_settings;
use crate::settings::{load_settings, save_settings, shellexpand_path};
use crate::store;

// Starter category tree for fresh installs.
const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Housing", &["Rent", "Utilities", "Maintenance"]),
    ("Food", &["Groceries", "Dining Out", "Coffee"]),
    ("Transport", &["Fuel", "Public Transit", "Parking"]),
    ("Leisure", &["Travel", "Subscriptions", "Hobbies"]),
    ("Income", &["Salary", "Interest", "Other Income"]),
];

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    std::fs::create_dir_all(&settings.data_dir)?;
    save_settings(&settings)?;

    let mut db = open_db()?;
    seed_currencies(&mut db)?;
    if db.rows(store::CATEGORIES)?.is_empty() {
        for (category, subcategories) in DEFAULT_CATEGORIES {
            let parent = add_category(&mut db, category)?;
            for name in *subcategories {
                add_subcategory(&mut db, &parent.id, name)?;
            }
        }
    }
    mirror_settings(&mut db, &settings)?;

    // make sure every table exists on disk, even the empty ones
    for table in store::TABLES {
        db.save(table)?;
    }

    println!(
        "{} data directory: {}",
        "Initialized".green().bold(),
        settings.data_dir
    );
    Ok(())
}
