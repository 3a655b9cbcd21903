use serde_json::json;

use crate::accounts::reorder;
use crate::error::{MintyError, Result};
use crate::models::{from_row, to_row, Category, Subcategory, Tag};
use crate::store::{self, str_field, Database};

pub fn list_categories(db: &Database) -> Result<Vec<Category>> {
    let mut categories: Vec<Category> = db
        .rows(store::CATEGORIES)?
        .iter()
        .map(from_row)
        .collect::<Result<_>>()?;
    categories.sort_by_key(|c| c.order);
    Ok(categories)
}

pub fn resolve_category(db: &Database, name_or_id: &str) -> Result<Category> {
    let needle = name_or_id.to_lowercase();
    for row in db.rows(store::CATEGORIES)? {
        let category: Category = from_row(row)?;
        if category.id == name_or_id || category.name.to_lowercase() == needle {
            return Ok(category);
        }
    }
    Err(MintyError::UnknownCategory(name_or_id.to_string()))
}

pub fn add_category(db: &mut Database, name: &str) -> Result<Category> {
    let name = non_empty(name, "category name")?;
    let next_order = list_categories(db)?.iter().map(|c| c.order).max().unwrap_or(0) + 1;
    let category = Category {
        id: store::new_id(),
        name,
        order: next_order,
    };
    db.insert(store::CATEGORIES, to_row(&category)?)?;
    Ok(category)
}

pub fn rename_category(db: &mut Database, id: &str, new_name: &str) -> Result<()> {
    let new_name = non_empty(new_name, "category name")?;
    db.update(store::CATEGORIES, id, |row| {
        row.insert("name".into(), json!(new_name));
    })
}

/// A category with subcategories cannot be deleted; its subcategories are
/// what transactions reference, so they must be moved or deleted first.
pub fn delete_category(db: &mut Database, id: &str) -> Result<()> {
    let category: Category = from_row(db.get(store::CATEGORIES, id)?)?;
    let children = db
        .rows(store::SUBCATEGORIES)?
        .iter()
        .filter(|row| str_field(row, "category_id") == Some(id))
        .count();
    if children > 0 {
        return Err(MintyError::Invalid {
            field: "category",
            reason: format!(
                "'{}' still has {children} subcategories; delete or move them first",
                category.name
            ),
        });
    }
    db.delete(store::CATEGORIES, id)
}

pub fn reorder_categories(db: &mut Database, ids: &[String]) -> Result<()> {
    reorder(db, store::CATEGORIES, ids)
}

pub fn list_subcategories(db: &Database, category_id: Option<&str>) -> Result<Vec<Subcategory>> {
    let mut subs: Vec<Subcategory> = db
        .rows(store::SUBCATEGORIES)?
        .iter()
        .map(from_row)
        .collect::<Result<_>>()?;
    if let Some(category_id) = category_id {
        subs.retain(|s| s.category_id == category_id);
    }
    subs.sort_by_key(|s| s.order);
    Ok(subs)
}

pub fn resolve_subcategory(db: &Database, name_or_id: &str) -> Result<Subcategory> {
    let needle = name_or_id.to_lowercase();
    for row in db.rows(store::SUBCATEGORIES)? {
        let sub: Subcategory = from_row(row)?;
        if sub.id == name_or_id || sub.name.to_lowercase() == needle {
            return Ok(sub);
        }
    }
    Err(MintyError::UnknownSubcategory(name_or_id.to_string()))
}

pub fn add_subcategory(db: &mut Database, category_id: &str, name: &str) -> Result<Subcategory> {
    let name = non_empty(name, "subcategory name")?;
    if db.find(store::CATEGORIES, category_id)?.is_none() {
        return Err(MintyError::UnknownCategory(category_id.to_string()));
    }
    let next_order = list_subcategories(db, Some(category_id))?
        .iter()
        .map(|s| s.order)
        .max()
        .unwrap_or(0)
        + 1;
    let sub = Subcategory {
        id: store::new_id(),
        category_id: category_id.to_string(),
        name,
        order: next_order,
    };
    db.insert(store::SUBCATEGORIES, to_row(&sub)?)?;
    Ok(sub)
}

pub fn rename_subcategory(db: &mut Database, id: &str, new_name: &str) -> Result<()> {
    let new_name = non_empty(new_name, "subcategory name")?;
    db.update(store::SUBCATEGORIES, id, |row| {
        row.insert("name".into(), json!(new_name));
    })
}

pub fn delete_subcategory(db: &mut Database, id: &str) -> Result<()> {
    let sub: Subcategory = from_row(db.get(store::SUBCATEGORIES, id)?)?;
    let used = db
        .rows(store::TRANSACTIONS)?
        .iter()
        .filter(|row| str_field(row, "subcategory_id") == Some(id))
        .count();
    if used > 0 {
        return Err(MintyError::InUse {
            entity: "Subcategory",
            name: sub.name,
            count: used,
        });
    }
    db.delete(store::SUBCATEGORIES, id)
}

pub fn list_tags(db: &Database) -> Result<Vec<Tag>> {
    let mut tags: Vec<Tag> = db
        .rows(store::TAGS)?
        .iter()
        .map(from_row)
        .collect::<Result<_>>()?;
    tags.sort_by_key(|t| t.order);
    Ok(tags)
}

pub fn add_tag(db: &mut Database, name: &str) -> Result<Tag> {
    let name = non_empty(name, "tag name")?;
    if list_tags(db)?.iter().any(|t| t.name.eq_ignore_ascii_case(&name)) {
        return Err(MintyError::Invalid {
            field: "tag",
            reason: format!("tag '{name}' already exists"),
        });
    }
    let next_order = list_tags(db)?.iter().map(|t| t.order).max().unwrap_or(0) + 1;
    let tag = Tag {
        id: store::new_id(),
        name,
        order: next_order,
    };
    db.insert(store::TAGS, to_row(&tag)?)?;
    Ok(tag)
}

pub fn rename_tag(db: &mut Database, id: &str, new_name: &str) -> Result<()> {
    let new_name = non_empty(new_name, "tag name")?;
    db.update(store::TAGS, id, |row| {
        row.insert("name".into(), json!(new_name));
    })
}

fn tag_usage(db: &Database, id: &str) -> Result<usize> {
    Ok(db
        .rows(store::TRANSACTIONS)?
        .iter()
        .filter(|row| {
            row.get("tag_ids")
                .and_then(|v| v.as_array())
                .map(|ids| ids.iter().any(|v| v.as_str() == Some(id)))
                .unwrap_or(false)
        })
        .count())
}

pub fn delete_tag(db: &mut Database, id: &str) -> Result<()> {
    let tag: Tag = from_row(db.get(store::TAGS, id)?)?;
    let used = tag_usage(db, id)?;
    if used > 0 {
        return Err(MintyError::InUse {
            entity: "Tag",
            name: tag.name,
            count: used,
        });
    }
    db.delete(store::TAGS, id)
}

fn non_empty(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MintyError::Invalid {
            field: "name",
            reason: format!("{field} cannot be empty"),
        });
    }
    Ok(trimmed.to_string())
}
