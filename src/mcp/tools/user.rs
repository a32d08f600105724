use serde_json::{Value, json};

use crate::models::FAMILY_MEMBERS;
use crate::state::AppState;
use crate::store::RemoteStore;

use super::{outcome, require_str, tool_result};

pub(super) fn handle_select_user<S: RemoteStore>(args: &Value, state: &mut AppState<S>) -> Value {
    let name = match require_str(args, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    outcome("select_user", state.select_user(&name).cloned())
}

pub(super) fn handle_get_user<S: RemoteStore>(state: &mut AppState<S>) -> Value {
    tool_result(&json!({
        "user": state.current_user(),
        "family": FAMILY_MEMBERS,
    }))
}

pub(super) fn handle_clear_user<S: RemoteStore>(state: &mut AppState<S>) -> Value {
    outcome("clear_user", state.clear_user().map(|()| json!({ "user": null })))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::{error_text, harness};

    #[test]
    fn test_select_and_get_user() {
        let mut h = harness();
        let user = h.ok("select_user", json!({ "name": " Hanna " }));
        assert_eq!(user["name"], "Hanna");

        let current = h.ok("get_user", json!({}));
        assert_eq!(current["user"]["name"], "Hanna");
        assert_eq!(current["family"].as_array().unwrap().len(), 5);
        assert_eq!(h.state.cache().load_user().unwrap().name, "Hanna");
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut h = harness();
        let result = h.call("select_user", json!({ "name": "   " }));
        error_text(&result);
        assert_eq!(h.state.current_user().unwrap().name, "Eva");
    }

    #[test]
    fn test_clear_user() {
        let mut h = harness();
        h.ok("clear_user", json!({}));
        let current = h.ok("get_user", json!({}));
        assert!(current["user"].is_null());
        assert!(h.state.cache().load_user().is_none());
    }
}
