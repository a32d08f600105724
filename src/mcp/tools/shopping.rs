use serde_json::{Value, json};

use crate::models::{NewShoppingItem, ShoppingCategory};
use crate::state::AppState;
use crate::store::RemoteStore;
use crate::views::{group_by_category, remaining_items, shopping_progress, sort_shopping_lists};

use super::{optional_str, outcome, parse_optional, require_str, tool_error, tool_result};

fn parse_item(args: &Value) -> Result<NewShoppingItem, Value> {
    let name = require_str(args, "name")?;
    let category = parse_optional::<ShoppingCategory>(args, "category")?.unwrap_or_default();
    Ok(NewShoppingItem {
        name,
        quantity: optional_str(args, "quantity"),
        category,
    })
}

pub(super) fn handle_create_shopping_list<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let name = match require_str(args, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let items = match args.get("items") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => {
            match entries.iter().map(parse_item).collect::<Result<Vec<_>, _>>() {
                Ok(items) => items,
                Err(e) => return e,
            }
        }
        Some(_) => return tool_error("Invalid items: expected an array of objects"),
    };

    outcome("create_shopping_list", state.create_shopping_list(&name, items))
}

pub(super) fn handle_list_shopping_lists<S: RemoteStore>(state: &mut AppState<S>) -> Value {
    let lists: Vec<Value> = sort_shopping_lists(state.shopping_lists())
        .into_iter()
        .map(|list| {
            json!({
                "id": list.id,
                "name": list.name,
                "total": list.items.len(),
                "remaining": remaining_items(list),
                "progress": shopping_progress(list),
                "updated_at": list.updated_at,
            })
        })
        .collect();
    tool_result(&lists)
}

pub(super) fn handle_get_shopping_list<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let id = match require_str(args, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    match state.shopping_list(&id) {
        Some(list) => tool_result(&json!({
            "id": list.id,
            "name": list.name,
            "progress": shopping_progress(list),
            "remaining": remaining_items(list),
            "groups": group_by_category(&list.items),
            "created_at": list.created_at,
            "updated_at": list.updated_at,
        })),
        None => tool_error(&format!("Shopping list not found: {id}")),
    }
}

pub(super) fn handle_rename_shopping_list<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let id = match require_str(args, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match require_str(args, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome("rename_shopping_list", state.rename_shopping_list(&id, &name))
}

pub(super) fn handle_delete_shopping_list<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let id = match require_str(args, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome(
        "delete_shopping_list",
        state
            .delete_shopping_list(&id)
            .map(|()| json!({ "deleted": true, "id": id })),
    )
}

pub(super) fn handle_add_shopping_item<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let list_id = match require_str(args, "list_id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let item = match parse_item(args) {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome("add_shopping_item", state.add_shopping_item(&list_id, item))
}

pub(super) fn handle_toggle_shopping_item<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let list_id = match require_str(args, "list_id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let item_id = match require_str(args, "item_id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome(
        "toggle_shopping_item",
        state.toggle_shopping_item(&list_id, &item_id),
    )
}

pub(super) fn handle_remove_shopping_item<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let list_id = match require_str(args, "list_id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let item_id = match require_str(args, "item_id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome(
        "remove_shopping_item",
        state.remove_shopping_item(&list_id, &item_id),
    )
}

pub(super) fn handle_list_categories() -> Value {
    let categories: Vec<Value> = ShoppingCategory::ALL
        .iter()
        .map(|c| json!({ "name": c.as_str(), "suggestions": c.suggestions() }))
        .collect();
    tool_result(&categories)
}
