mod overview;
mod project;
mod shopping;
mod user;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::state::AppState;
use crate::store::RemoteStore;

fn tool(name: &str, description: &str, properties: Value, required: &[&str]) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": required,
        }
    })
}

fn category_schema() -> Value {
    json!({
        "type": "string",
        "enum": crate::models::ShoppingCategory::ALL.map(|c| c.as_str()),
        "description": "Category label, defaults to Övrigt"
    })
}

pub fn tool_definitions() -> Vec<Value> {
    vec![
        // User tools
        tool(
            "select_user",
            "Select the family member making changes",
            json!({
                "name": { "type": "string", "description": "Family member name" }
            }),
            &["name"],
        ),
        tool("get_user", "Get the selected family member", json!({}), &[]),
        tool("clear_user", "Clear the selected family member", json!({}), &[]),
        tool(
            "get_overview",
            "Home summary: project count, recent projects and shopping lists",
            json!({}),
            &[],
        ),
        tool(
            "reload",
            "Re-read projects and shopping lists from the store, falling back to the local cache",
            json!({}),
            &[],
        ),
        // Project tools
        tool(
            "create_project",
            "Create a new project",
            json!({
                "title": { "type": "string", "description": "Project title" },
                "description": { "type": "string", "description": "Project description" },
                "checklist": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Initial checklist entries"
                }
            }),
            &["title"],
        ),
        tool(
            "list_projects",
            "List all projects",
            json!({
                "sort": {
                    "type": "string",
                    "enum": ["date", "progress", "title"],
                    "description": "Sort key, defaults to date"
                }
            }),
            &[],
        ),
        tool(
            "get_project",
            "Get a project with its checklist and comments",
            json!({
                "id": { "type": "string", "description": "Project ID" }
            }),
            &["id"],
        ),
        tool(
            "update_project",
            "Edit a project's title or description",
            json!({
                "id": { "type": "string", "description": "Project ID" },
                "title": { "type": "string", "description": "New title" },
                "description": { "type": "string", "description": "New description" }
            }),
            &["id"],
        ),
        tool(
            "delete_project",
            "Delete a project",
            json!({
                "id": { "type": "string", "description": "Project ID" }
            }),
            &["id"],
        ),
        tool(
            "add_checklist_item",
            "Append an item to a project's checklist",
            json!({
                "project_id": { "type": "string", "description": "Project ID" },
                "text": { "type": "string", "description": "Item text" }
            }),
            &["project_id", "text"],
        ),
        tool(
            "toggle_checklist_item",
            "Flip a checklist item between done and open",
            json!({
                "project_id": { "type": "string", "description": "Project ID" },
                "item_id": { "type": "string", "description": "Checklist item ID" }
            }),
            &["project_id", "item_id"],
        ),
        tool(
            "remove_checklist_item",
            "Remove an item from a project's checklist",
            json!({
                "project_id": { "type": "string", "description": "Project ID" },
                "item_id": { "type": "string", "description": "Checklist item ID" }
            }),
            &["project_id", "item_id"],
        ),
        tool(
            "add_comment",
            "Comment on a project as the selected user",
            json!({
                "project_id": { "type": "string", "description": "Project ID" },
                "text": { "type": "string", "description": "Comment text" }
            }),
            &["project_id", "text"],
        ),
        // Shopping tools
        tool(
            "create_shopping_list",
            "Create a new shopping list",
            json!({
                "name": { "type": "string", "description": "List name" },
                "items": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "quantity": { "type": "string" },
                            "category": category_schema()
                        },
                        "required": ["name"]
                    },
                    "description": "Initial items"
                }
            }),
            &["name"],
        ),
        tool(
            "list_shopping_lists",
            "List shopping lists with remaining item counts",
            json!({}),
            &[],
        ),
        tool(
            "get_shopping_list",
            "Get a shopping list grouped by category",
            json!({
                "id": { "type": "string", "description": "Shopping list ID" }
            }),
            &["id"],
        ),
        tool(
            "rename_shopping_list",
            "Rename a shopping list",
            json!({
                "id": { "type": "string", "description": "Shopping list ID" },
                "name": { "type": "string", "description": "New name" }
            }),
            &["id", "name"],
        ),
        tool(
            "delete_shopping_list",
            "Delete a shopping list",
            json!({
                "id": { "type": "string", "description": "Shopping list ID" }
            }),
            &["id"],
        ),
        tool(
            "add_shopping_item",
            "Add an item to a shopping list",
            json!({
                "list_id": { "type": "string", "description": "Shopping list ID" },
                "name": { "type": "string", "description": "Item name" },
                "quantity": { "type": "string", "description": "Free-form quantity" },
                "category": category_schema()
            }),
            &["list_id", "name"],
        ),
        tool(
            "toggle_shopping_item",
            "Check or uncheck a shopping item",
            json!({
                "list_id": { "type": "string", "description": "Shopping list ID" },
                "item_id": { "type": "string", "description": "Item ID" }
            }),
            &["list_id", "item_id"],
        ),
        tool(
            "remove_shopping_item",
            "Remove an item from a shopping list",
            json!({
                "list_id": { "type": "string", "description": "Shopping list ID" },
                "item_id": { "type": "string", "description": "Item ID" }
            }),
            &["list_id", "item_id"],
        ),
        tool(
            "list_categories",
            "List shopping categories with suggested items",
            json!({}),
            &[],
        ),
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn tool_result(data: &impl Serialize) -> Value {
    let text = serde_json::to_string_pretty(data)
        .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"));
    json!({ "content": [{ "type": "text", "text": text }] })
}

pub(crate) fn tool_error(msg: &str) -> Value {
    json!({ "content": [{ "type": "text", "text": msg }], "isError": true })
}

/// Maps an application-state outcome onto a tool result.
pub(crate) fn outcome<T: Serialize>(tool: &str, result: anyhow::Result<T>) -> Value {
    match result {
        Ok(data) => tool_result(&data),
        Err(e) => {
            debug!(tool, "tool call rejected: {e:#}");
            tool_error(&format!("{e:#}"))
        }
    }
}

pub(crate) fn require_str(args: &Value, field: &str) -> Result<String, Value> {
    args.get(field)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| tool_error(&format!("Missing required parameter: {field}")))
}

pub(crate) fn optional_str(args: &Value, field: &str) -> Option<String> {
    args.get(field).and_then(|v| v.as_str()).map(String::from)
}

pub(crate) fn parse_optional<T: std::str::FromStr>(
    args: &Value,
    field: &str,
) -> Result<Option<T>, Value> {
    match optional_str(args, field) {
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| tool_error(&format!("Invalid {field}: {s}"))),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch_tool<S: RemoteStore>(
    name: &str,
    args: &Value,
    state: &mut AppState<S>,
) -> Option<Value> {
    let result = match name {
        "select_user" => user::handle_select_user(args, state),
        "get_user" => user::handle_get_user(state),
        "clear_user" => user::handle_clear_user(state),
        "get_overview" => overview::handle_get_overview(state),
        "reload" => overview::handle_reload(state),
        "create_project" => project::handle_create_project(args, state),
        "list_projects" => project::handle_list_projects(args, state),
        "get_project" => project::handle_get_project(args, state),
        "update_project" => project::handle_update_project(args, state),
        "delete_project" => project::handle_delete_project(args, state),
        "add_checklist_item" => project::handle_add_checklist_item(args, state),
        "toggle_checklist_item" => project::handle_toggle_checklist_item(args, state),
        "remove_checklist_item" => project::handle_remove_checklist_item(args, state),
        "add_comment" => project::handle_add_comment(args, state),
        "create_shopping_list" => shopping::handle_create_shopping_list(args, state),
        "list_shopping_lists" => shopping::handle_list_shopping_lists(state),
        "get_shopping_list" => shopping::handle_get_shopping_list(args, state),
        "rename_shopping_list" => shopping::handle_rename_shopping_list(args, state),
        "delete_shopping_list" => shopping::handle_delete_shopping_list(args, state),
        "add_shopping_item" => shopping::handle_add_shopping_item(args, state),
        "toggle_shopping_item" => shopping::handle_toggle_shopping_item(args, state),
        "remove_shopping_item" => shopping::handle_remove_shopping_item(args, state),
        "list_categories" => shopping::handle_list_categories(),
        _ => return None,
    };
    Some(result)
}
