use comfy_table::{Cell, Table};

use crate::categories::{
    add_category, add_subcategory, add_tag, delete_category, delete_subcategory, delete_tag,
    list_categories, list_subcategories, list_tags, rename_category, rename_subcategory,
    rename_tag, reorder_categories, resolve_category, resolve_subcategory,
};
use crate::cli::open_db;
use crate::error::{MintyError, Result};

pub fn add(name: &str) -> Result<()> {
    let mut db = open_db()?;
    let category = add_category(&mut db, name)?;
    println!("Added category: {} ({})", category.name, category.id);
    Ok(())
}

pub fn list() -> Result<()> {
    let db = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["#", "ID", "Category", "Subcategories"]);
    for category in list_categories(&db)? {
        let subs = list_subcategories(&db, Some(&category.id))?
            .iter()
            .map(|s| s.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(category.order),
            Cell::new(&category.id),
            Cell::new(&category.name),
            Cell::new(subs),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn rename(category: &str, new_name: &str) -> Result<()> {
    let mut db = open_db()?;
    let category = resolve_category(&db, category)?;
    rename_category(&mut db, &category.id, new_name)?;
    println!("Renamed '{}' to '{new_name}'", category.name);
    Ok(())
}

pub fn delete(category: &str) -> Result<()> {
    let mut db = open_db()?;
    let category = resolve_category(&db, category)?;
    delete_category(&mut db, &category.id)?;
    println!("Deleted category: {}", category.name);
    Ok(())
}

pub fn reorder(categories: &[String]) -> Result<()> {
    let mut db = open_db()?;
    let mut ids = Vec::with_capacity(categories.len());
    for name in categories {
        ids.push(resolve_category(&db, name)?.id);
    }
    reorder_categories(&mut db, &ids)?;
    println!("Reordered {} categories", ids.len());
    Ok(())
}

pub fn add_sub(category: &str, name: &str) -> Result<()> {
    let mut db = open_db()?;
    let category = resolve_category(&db, category)?;
    let sub = add_subcategory(&mut db, &category.id, name)?;
    println!("Added subcategory: {} under {} ({})", sub.name, category.name, sub.id);
    Ok(())
}

pub fn rename_sub(subcategory: &str, new_name: &str) -> Result<()> {
    let mut db = open_db()?;
    let sub = resolve_subcategory(&db, subcategory)?;
    rename_subcategory(&mut db, &sub.id, new_name)?;
    println!("Renamed '{}' to '{new_name}'", sub.name);
    Ok(())
}

pub fn delete_sub(subcategory: &str) -> Result<()> {
    let mut db = open_db()?;
    let sub = resolve_subcategory(&db, subcategory)?;
    delete_subcategory(&mut db, &sub.id)?;
    println!("Deleted subcategory: {}", sub.name);
    Ok(())
}

pub fn tag_add(name: &str) -> Result<()> {
    let mut db = open_db()?;
    let tag = add_tag(&mut db, name)?;
    println!("Added tag: {} ({})", tag.name, tag.id);
    Ok(())
}

pub fn tag_list() -> Result<()> {
    let db = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["#", "ID", "Name"]);
    for tag in list_tags(&db)? {
        table.add_row(vec![
            Cell::new(tag.order),
            Cell::new(&tag.id),
            Cell::new(&tag.name),
        ]);
    }
    println!("Tags\n{table}");
    Ok(())
}

pub fn tag_rename(tag: &str, new_name: &str) -> Result<()> {
    let mut db = open_db()?;
    let tag = resolve_tag_arg(&db, tag)?;
    rename_tag(&mut db, &tag, new_name)?;
    println!("Renamed tag to '{new_name}'");
    Ok(())
}

pub fn tag_delete(tag: &str) -> Result<()> {
    let mut db = open_db()?;
    let tag = resolve_tag_arg(&db, tag)?;
    delete_tag(&mut db, &tag)?;
    println!("Deleted tag");
    Ok(())
}

fn resolve_tag_arg(db: &crate::store::Database, name_or_id: &str) -> Result<String> {
    let needle = name_or_id.to_lowercase();
    list_tags(db)?
        .into_iter()
        .find(|t| t.id == name_or_id || t.name.to_lowercase() == needle)
        .map(|t| t.id)
        .ok_or_else(|| MintyError::UnknownTag(name_or_id.to_string()))
}
