use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::db::Database;
use crate::db::codec::{
    conversion_error, decode_collection, decode_timestamp, encode_collection, encode_timestamp,
};
use crate::models::{CreateShoppingListInput, ShoppingList, UpdateShoppingListInput, new_id};

const SELECT_COLUMNS: &str = "id, name, items, created_at, updated_at";

fn row_to_list(row: &Row) -> rusqlite::Result<ShoppingList> {
    let items: String = row.get("items")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(ShoppingList {
        id: row.get("id")?,
        name: row.get("name")?,
        items: decode_collection("items", &items).map_err(|e| conversion_error(2, e))?,
        created_at: decode_timestamp(&created_at).map_err(|e| conversion_error(3, e))?,
        updated_at: decode_timestamp(&updated_at).map_err(|e| conversion_error(4, e))?,
    })
}

pub fn create_shopping_list(db: &Database, input: CreateShoppingListInput) -> Result<ShoppingList> {
    let id = new_id();
    let now = encode_timestamp(Utc::now());
    let items = encode_collection(&input.items)?;

    db.conn()
        .execute(
            "INSERT INTO shopping_lists (id, name, items, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, input.name, items, now],
        )
        .context("failed to insert shopping list")?;

    get_shopping_list(db, &id)?.context("shopping list not found after insert")
}

pub fn get_shopping_list(db: &Database, id: &str) -> Result<Option<ShoppingList>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM shopping_lists WHERE id = ?1");
    db.conn()
        .prepare(&sql)?
        .query_row([id], row_to_list)
        .optional()
        .context("failed to query shopping list")
}

/// All shopping lists, newest first.
pub fn list_shopping_lists(db: &Database) -> Result<Vec<ShoppingList>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM shopping_lists ORDER BY created_at DESC, rowid DESC"
    );

    let mut stmt = db.conn().prepare(&sql)?;
    let rows = stmt.query_map([], row_to_list)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to list shopping lists")
}

pub fn update_shopping_list(
    db: &Database,
    id: &str,
    input: UpdateShoppingListInput,
) -> Result<ShoppingList> {
    let mut set_clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    let mut bind = |column: &str, value: Box<dyn rusqlite::types::ToSql>| {
        params.push(value);
        set_clauses.push(format!("\"{column}\" = ?{}", params.len()));
    };

    if let Some(name) = input.name {
        bind("name", Box::new(name));
    }
    if let Some(items) = input.items {
        bind("items", Box::new(encode_collection(&items)?));
    }
    bind("updated_at", Box::new(encode_timestamp(Utc::now())));

    params.push(Box::new(id.to_string()));

    let sql = format!(
        "UPDATE shopping_lists SET {} WHERE id = ?{}",
        set_clauses.join(", "),
        params.len(),
    );

    let rows_affected = db
        .conn()
        .execute(&sql, params_from_iter(params.iter()))
        .context("failed to update shopping list")?;

    if rows_affected == 0 {
        anyhow::bail!("shopping list not found: {id}");
    }

    get_shopping_list(db, id)?.context("shopping list not found after update")
}

pub fn delete_shopping_list(db: &Database, id: &str) -> Result<bool> {
    let rows_affected = db
        .conn()
        .execute("DELETE FROM shopping_lists WHERE id = ?1", [id])
        .context("failed to delete shopping list")?;

    Ok(rows_affected > 0)
}
