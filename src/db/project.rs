use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::db::Database;
use crate::db::codec::{
    conversion_error, decode_collection, decode_timestamp, encode_collection, encode_timestamp,
};
use crate::models::{CreateProjectInput, Project, UpdateProjectInput, new_id};

const SELECT_COLUMNS: &str =
    "id, title, description, checklist, progress, comments, created_at, updated_at";

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    let checklist: String = row.get("checklist")?;
    let comments: String = row.get("comments")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Project {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        checklist: decode_collection("checklist", &checklist)
            .map_err(|e| conversion_error(3, e))?,
        progress: row.get("progress")?,
        comments: decode_collection("comments", &comments)
            .map_err(|e| conversion_error(5, e))?,
        created_at: decode_timestamp(&created_at).map_err(|e| conversion_error(6, e))?,
        updated_at: decode_timestamp(&updated_at).map_err(|e| conversion_error(7, e))?,
    })
}

pub fn create_project(db: &Database, input: CreateProjectInput) -> Result<Project> {
    let id = new_id();
    let now = encode_timestamp(Utc::now());
    let checklist = encode_collection(&input.checklist)?;
    let comments = encode_collection(&input.comments)?;

    db.conn()
        .execute(
            "INSERT INTO projects \
             (id, title, description, checklist, progress, comments, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                id,
                input.title,
                input.description,
                checklist,
                input.progress,
                comments,
                now
            ],
        )
        .context("failed to insert project")?;

    get_project(db, &id)?.context("project not found after insert")
}

pub fn get_project(db: &Database, id: &str) -> Result<Option<Project>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM projects WHERE id = ?1");
    let project = db
        .conn()
        .prepare(&sql)?
        .query_row([id], row_to_project)
        .optional()
        .context("failed to query project")?;

    Ok(project)
}

/// All projects, newest first.
pub fn list_projects(db: &Database) -> Result<Vec<Project>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM projects ORDER BY created_at DESC, rowid DESC");

    let mut stmt = db.conn().prepare(&sql)?;
    let rows = stmt.query_map([], row_to_project)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to list projects")
}

pub fn update_project(db: &Database, id: &str, input: UpdateProjectInput) -> Result<Project> {
    let mut set_clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    let mut bind = |column: &str, value: Box<dyn rusqlite::types::ToSql>| {
        params.push(value);
        set_clauses.push(format!("\"{column}\" = ?{}", params.len()));
    };

    if let Some(title) = input.title {
        bind("title", Box::new(title));
    }
    if let Some(description) = input.description {
        bind("description", Box::new(description));
    }
    if let Some(progress) = input.progress {
        bind("progress", Box::new(progress));
    }
    if let Some(checklist) = input.checklist {
        bind("checklist", Box::new(encode_collection(&checklist)?));
    }
    if let Some(comments) = input.comments {
        bind("comments", Box::new(encode_collection(&comments)?));
    }
    bind("updated_at", Box::new(encode_timestamp(Utc::now())));

    params.push(Box::new(id.to_string()));

    let sql = format!(
        "UPDATE projects SET {} WHERE id = ?{}",
        set_clauses.join(", "),
        params.len(),
    );

    let rows_affected = db
        .conn()
        .execute(&sql, params_from_iter(params.iter()))
        .context("failed to update project")?;

    if rows_affected == 0 {
        anyhow::bail!("project not found: {id}");
    }

    get_project(db, id)?.context("project not found after update")
}

pub fn delete_project(db: &Database, id: &str) -> Result<bool> {
    let rows_affected = db
        .conn()
        .execute("DELETE FROM projects WHERE id = ?1", [id])
        .context("failed to delete project")?;

    Ok(rows_affected > 0)
}
