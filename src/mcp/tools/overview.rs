use serde_json::{Value, json};

use crate::state::{AppState, DataSource};
use crate::store::RemoteStore;
use crate::views::overview;

use super::tool_result;

pub(super) fn handle_get_overview<S: RemoteStore>(state: &mut AppState<S>) -> Value {
    let summary = overview(
        state.current_user(),
        state.projects(),
        state.shopping_lists(),
    );
    let mut value = json!(summary);
    value["offline"] = json!(state.source() == DataSource::Cache);
    tool_result(&value)
}

pub(super) fn handle_reload<S: RemoteStore>(state: &mut AppState<S>) -> Value {
    let source = state.load();
    tool_result(&json!({
        "offline": source == DataSource::Cache,
        "project_count": state.projects().len(),
        "shopping_list_count": state.shopping_lists().len(),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::harness;
    use crate::models::CreateProjectInput;
    use crate::store::RemoteStore;

    #[test]
    fn test_reload_picks_up_store_changes() {
        let mut h = harness();
        h.ok("create_project", json!({ "title": "Mine" }));
        h.state
            .data()
            .store()
            .insert_project(CreateProjectInput {
                title: "From elsewhere".to_string(),
                description: String::new(),
                checklist: Vec::new(),
                comments: Vec::new(),
                progress: 0,
            })
            .unwrap();
        assert_eq!(h.ok("get_overview", json!({}))["project_count"], 1);

        let reloaded = h.ok("reload", json!({}));
        assert_eq!(reloaded["offline"], false);
        assert_eq!(reloaded["project_count"], 2);
        assert_eq!(reloaded["shopping_list_count"], 0);
        assert_eq!(h.ok("get_overview", json!({}))["user"], "Eva");
    }

    #[test]
    fn test_overview_previews_three_newest_projects() {
        let mut h = harness();
        for title in ["one", "two", "three", "four"] {
            h.ok("create_project", json!({ "title": title }));
        }
        h.ok(
            "create_shopping_list",
            json!({ "name": "Mat", "items": [{ "name": "Bröd" }] }),
        );

        let summary = h.ok("get_overview", json!({}));
        assert_eq!(summary["user"], "Eva");
        assert_eq!(summary["project_count"], 4);
        let recent: Vec<&str> = summary["recent_projects"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(recent, ["four", "three", "two"]);
        assert_eq!(summary["shopping_list_count"], 1);
        assert_eq!(summary["shopping_lists"][0]["remaining"], 1);
        assert_eq!(summary["offline"], false);
    }
}
