use serde_json::{Value, json};

use crate::state::AppState;
use crate::store::RemoteStore;
use crate::views::{ProjectSort, sort_projects};

use super::{optional_str, outcome, parse_optional, require_str, tool_error, tool_result};

pub(super) fn handle_create_project<S: RemoteStore>(args: &Value, state: &mut AppState<S>) -> Value {
    let title = match require_str(args, "title") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let description = optional_str(args, "description").unwrap_or_default();
    let checklist: Vec<String> = match args.get("checklist") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => {
            let texts: Option<Vec<String>> = entries
                .iter()
                .map(|v| v.as_str().map(String::from))
                .collect();
            match texts {
                Some(texts) => texts,
                None => return tool_error("Invalid checklist: expected an array of strings"),
            }
        }
        Some(_) => return tool_error("Invalid checklist: expected an array of strings"),
    };

    outcome(
        "create_project",
        state.create_project(&title, &description, &checklist),
    )
}

pub(super) fn handle_list_projects<S: RemoteStore>(args: &Value, state: &mut AppState<S>) -> Value {
    let sort = match parse_optional::<ProjectSort>(args, "sort") {
        Ok(s) => s.unwrap_or_default(),
        Err(e) => return e,
    };
    tool_result(&sort_projects(state.projects(), sort))
}

pub(super) fn handle_get_project<S: RemoteStore>(args: &Value, state: &mut AppState<S>) -> Value {
    let id = match require_str(args, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    match state.project(&id) {
        Some(project) => tool_result(&json!({
            "project": project,
            "done": project.completed_count(),
            "total": project.checklist.len(),
        })),
        None => tool_error(&format!("Project not found: {id}")),
    }
}

pub(super) fn handle_update_project<S: RemoteStore>(args: &Value, state: &mut AppState<S>) -> Value {
    let id = match require_str(args, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(current) = state.project(&id) else {
        return tool_error(&format!("Project not found: {id}"));
    };

    let title = optional_str(args, "title").unwrap_or_else(|| current.title.clone());
    let description =
        optional_str(args, "description").unwrap_or_else(|| current.description.clone());

    outcome("update_project", state.edit_project(&id, &title, &description))
}

pub(super) fn handle_delete_project<S: RemoteStore>(args: &Value, state: &mut AppState<S>) -> Value {
    let id = match require_str(args, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome(
        "delete_project",
        state
            .delete_project(&id)
            .map(|()| json!({ "deleted": true, "id": id })),
    )
}

pub(super) fn handle_add_checklist_item<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let project_id = match require_str(args, "project_id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let text = match require_str(args, "text") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome(
        "add_checklist_item",
        state.add_checklist_item(&project_id, &text),
    )
}

pub(super) fn handle_toggle_checklist_item<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let project_id = match require_str(args, "project_id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let item_id = match require_str(args, "item_id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome(
        "toggle_checklist_item",
        state.toggle_checklist_item(&project_id, &item_id),
    )
}

pub(super) fn handle_remove_checklist_item<S: RemoteStore>(
    args: &Value,
    state: &mut AppState<S>,
) -> Value {
    let project_id = match require_str(args, "project_id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let item_id = match require_str(args, "item_id") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome(
        "remove_checklist_item",
        state.remove_checklist_item(&project_id, &item_id),
    )
}

pub(super) fn handle_add_comment<S: RemoteStore>(args: &Value, state: &mut AppState<S>) -> Value {
    let project_id = match require_str(args, "project_id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let text = match require_str(args, "text") {
        Ok(v) => v,
        Err(e) => return e,
    };

    outcome("add_comment", state.add_comment(&project_id, &text))
}
