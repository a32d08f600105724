use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::warn;

use crate::models::{
    FAMILY_MEMBERS, NewShoppingItem, Project, ShoppingCategory, ShoppingItem, ShoppingList,
};
use crate::state::{AppState, DataSource};
use crate::store::RemoteStore;
use crate::tui::ui;
use crate::views::{ProjectSort, group_by_category, sort_projects, sort_shopping_lists};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    UserSelect,
    Home,
    Projects,
    ProjectDetail,
    ShoppingLists,
    ShoppingDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    CustomUser,
    NewProject,
    EditTitle,
    /// Second step of editing; carries the title entered in the first.
    EditDescription {
        title: String,
    },
    AddChecklistItem,
    AddComment,
    NewShoppingList,
    RenameShoppingList,
    AddShoppingItem,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CustomUser => " Your name ",
            Self::NewProject => " New project ",
            Self::EditTitle => " Title ",
            Self::EditDescription { .. } => " Description ",
            Self::AddChecklistItem => " Checklist item ",
            Self::AddComment => " Comment ",
            Self::NewShoppingList => " New shopping list ",
            Self::RenameShoppingList => " Rename list ",
            Self::AddShoppingItem => " Item (name, quantity) ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
    /// Only used by [`PromptKind::AddShoppingItem`]; Tab cycles it.
    pub category: ShoppingCategory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDelete {
    Project(String),
    ShoppingList(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Prompt(Prompt),
    Confirm(PendingDelete),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App<S> {
    pub state: AppState<S>,
    pub running: bool,
    pub screen: Screen,
    pub mode: InputMode,
    pub sort: ProjectSort,
    /// Cursor in the user selector; one past the roster is "someone else".
    pub user_idx: usize,
    pub project_idx: usize,
    pub list_idx: usize,
    /// Cursor in the open project's checklist or the open list's items.
    pub item_idx: usize,
    pub open_project: Option<String>,
    pub open_list: Option<String>,
    /// Category whose suggestions the digit keys add.
    pub quick_category: ShoppingCategory,
    pub status: Option<StatusMessage>,
}

/// Wraps an index by `delta` within `len`, returning `None` when the list is empty.
fn wrap_index(current: usize, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(((current as isize + delta).rem_euclid(len as isize)) as usize)
}

/// Splits `"Mjölk, 2 l"` into a name and an optional quantity.
pub fn parse_item_input(input: &str, category: ShoppingCategory) -> NewShoppingItem {
    let (name, quantity) = match input.split_once(',') {
        Some((name, quantity)) => (name, Some(quantity.trim().to_string())),
        None => (input, None),
    };
    NewShoppingItem {
        name: name.trim().to_string(),
        quantity: quantity.filter(|q| !q.is_empty()),
        category,
    }
}

impl<S: RemoteStore> App<S> {
    pub fn new(state: AppState<S>) -> Self {
        let screen = if state.current_user().is_some() {
            Screen::Home
        } else {
            Screen::UserSelect
        };
        Self {
            state,
            running: true,
            screen,
            mode: InputMode::Normal,
            sort: ProjectSort::default(),
            user_idx: 0,
            project_idx: 0,
            list_idx: 0,
            item_idx: 0,
            open_project: None,
            open_list: None,
            quick_category: ShoppingCategory::default(),
            status: None,
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        if self.state.source() == DataSource::Cache {
            self.set_error("Store unreachable, showing cached data");
        }

        while self.running {
            terminal.draw(|frame| ui::draw(frame, self))?;

            if event::poll(Duration::from_millis(250))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    // ── Derived selections ─────────────────────────────────────────

    pub fn user_choices(&self) -> usize {
        FAMILY_MEMBERS.len() + 1
    }

    pub fn visible_projects(&self) -> Vec<&Project> {
        sort_projects(self.state.projects(), self.sort)
    }

    pub fn visible_lists(&self) -> Vec<&ShoppingList> {
        sort_shopping_lists(self.state.shopping_lists())
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.open_project
            .as_deref()
            .and_then(|id| self.state.project(id))
    }

    pub fn current_list(&self) -> Option<&ShoppingList> {
        self.open_list
            .as_deref()
            .and_then(|id| self.state.shopping_list(id))
    }

    /// Items of the open list in the order they are drawn: grouped by category.
    pub fn shopping_rows(&self) -> Vec<&ShoppingItem> {
        self.current_list()
            .map(|list| {
                group_by_category(&list.items)
                    .into_iter()
                    .flat_map(|group| group.items)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn selected_project_id(&self) -> Option<String> {
        self.visible_projects()
            .get(self.project_idx)
            .map(|p| p.id.clone())
    }

    fn selected_list_id(&self) -> Option<String> {
        self.visible_lists().get(self.list_idx).map(|l| l.id.clone())
    }

    fn selected_checklist_item(&self) -> Option<(String, String)> {
        let project = self.current_project()?;
        let item = project.checklist.get(self.item_idx)?;
        Some((project.id.clone(), item.id.clone()))
    }

    fn selected_shopping_item(&self) -> Option<(String, String)> {
        let list_id = self.current_list()?.id.clone();
        let item = self.shopping_rows().get(self.item_idx)?.id.clone();
        Some((list_id, item))
    }

    fn clamp_selection(&mut self) {
        let max = |len: usize| len.saturating_sub(1);
        self.project_idx = self.project_idx.min(max(self.state.projects().len()));
        self.list_idx = self.list_idx.min(max(self.state.shopping_lists().len()));
        let items = match self.screen {
            Screen::ProjectDetail => self.current_project().map_or(0, |p| p.checklist.len()),
            Screen::ShoppingDetail => self.shopping_rows().len(),
            _ => 0,
        };
        self.item_idx = self.item_idx.min(max(items));
    }

    // ── Status line ────────────────────────────────────────────────

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    /// Shows the outcome of a state operation on the status line.
    fn report<T>(&mut self, result: Result<T>, done: &str) -> Option<T> {
        let outcome = match result {
            Ok(value) => {
                self.set_status(done);
                Some(value)
            }
            Err(e) => {
                warn!("{e:#}");
                self.set_error(format!("{e:#}"));
                None
            }
        };
        self.clamp_selection();
        outcome
    }

    // ── Key handling ───────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Prompt(_) => self.handle_prompt_key(key),
            InputMode::Confirm(_) => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        self.status = None;
        if key.code == KeyCode::Char('q') {
            self.running = false;
            return;
        }
        match self.screen {
            Screen::UserSelect => self.handle_user_select_key(key),
            Screen::Home => self.handle_home_key(key),
            Screen::Projects => self.handle_projects_key(key),
            Screen::ProjectDetail => self.handle_project_detail_key(key),
            Screen::ShoppingLists => self.handle_shopping_lists_key(key),
            Screen::ShoppingDetail => self.handle_shopping_detail_key(key),
        }
    }

    fn handle_user_select_key(&mut self, key: KeyEvent) {
        let len = self.user_choices();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.user_idx = (self.user_idx + 1) % len;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.user_idx = (self.user_idx + len - 1) % len;
            }
            KeyCode::Enter => match FAMILY_MEMBERS.get(self.user_idx) {
                Some(name) => self.select_user(name),
                None => self.open_prompt(PromptKind::CustomUser, String::new()),
            },
            KeyCode::Esc if self.state.current_user().is_some() => self.screen = Screen::Home,
            _ => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('1') | KeyCode::Char('p') => {
                self.project_idx = 0;
                self.screen = Screen::Projects;
            }
            KeyCode::Char('2') | KeyCode::Char('l') => {
                self.list_idx = 0;
                self.screen = Screen::ShoppingLists;
            }
            KeyCode::Char('u') => self.open_user_select(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    fn handle_projects_key(&mut self, key: KeyEvent) {
        let len = self.state.projects().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(next) = wrap_index(self.project_idx, len, 1) {
                    self.project_idx = next;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(next) = wrap_index(self.project_idx, len, -1) {
                    self.project_idx = next;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_project_id() {
                    self.open_project = Some(id);
                    self.item_idx = 0;
                    self.screen = Screen::ProjectDetail;
                }
            }
            KeyCode::Char('s') => {
                self.sort = self.sort.next();
                self.project_idx = 0;
                self.set_status(format!("Sorted by {}", self.sort));
            }
            KeyCode::Char('n') => self.open_prompt(PromptKind::NewProject, String::new()),
            KeyCode::Char('D') => {
                if let Some(id) = self.selected_project_id() {
                    self.mode = InputMode::Confirm(PendingDelete::Project(id));
                }
            }
            KeyCode::Esc => self.screen = Screen::Home,
            _ => {}
        }
    }

    fn handle_project_detail_key(&mut self, key: KeyEvent) {
        let Some(project) = self.current_project() else {
            self.screen = Screen::Projects;
            return;
        };
        let len = project.checklist.len();
        let project_id = project.id.clone();
        let title = project.title.clone();

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(next) = wrap_index(self.item_idx, len, 1) {
                    self.item_idx = next;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(next) = wrap_index(self.item_idx, len, -1) {
                    self.item_idx = next;
                }
            }
            KeyCode::Char(' ') => {
                if let Some((project_id, item_id)) = self.selected_checklist_item() {
                    let result = self.state.toggle_checklist_item(&project_id, &item_id);
                    self.report(result, "Checklist updated");
                }
            }
            KeyCode::Char('x') => {
                if let Some((project_id, item_id)) = self.selected_checklist_item() {
                    let result = self.state.remove_checklist_item(&project_id, &item_id);
                    self.report(result, "Item removed");
                }
            }
            KeyCode::Char('a') => self.open_prompt(PromptKind::AddChecklistItem, String::new()),
            KeyCode::Char('c') => self.open_prompt(PromptKind::AddComment, String::new()),
            KeyCode::Char('e') => self.open_prompt(PromptKind::EditTitle, title),
            KeyCode::Char('D') => {
                self.mode = InputMode::Confirm(PendingDelete::Project(project_id));
            }
            KeyCode::Esc => {
                self.open_project = None;
                self.screen = Screen::Projects;
            }
            _ => {}
        }
    }

    fn handle_shopping_lists_key(&mut self, key: KeyEvent) {
        let len = self.state.shopping_lists().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(next) = wrap_index(self.list_idx, len, 1) {
                    self.list_idx = next;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(next) = wrap_index(self.list_idx, len, -1) {
                    self.list_idx = next;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_list_id() {
                    self.open_list = Some(id);
                    self.item_idx = 0;
                    self.screen = Screen::ShoppingDetail;
                }
            }
            KeyCode::Char('n') => self.open_prompt(PromptKind::NewShoppingList, String::new()),
            KeyCode::Char('r') => {
                if let Some(id) = self.selected_list_id() {
                    let name = self
                        .state
                        .shopping_list(&id)
                        .map(|l| l.name.clone())
                        .unwrap_or_default();
                    self.open_list = Some(id);
                    self.open_prompt(PromptKind::RenameShoppingList, name);
                }
            }
            KeyCode::Char('D') => {
                if let Some(id) = self.selected_list_id() {
                    self.mode = InputMode::Confirm(PendingDelete::ShoppingList(id));
                }
            }
            KeyCode::Esc => self.screen = Screen::Home,
            _ => {}
        }
    }

    fn handle_shopping_detail_key(&mut self, key: KeyEvent) {
        let Some(list) = self.current_list() else {
            self.screen = Screen::ShoppingLists;
            return;
        };
        let list_id = list.id.clone();
        let name = list.name.clone();
        let len = self.shopping_rows().len();

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(next) = wrap_index(self.item_idx, len, 1) {
                    self.item_idx = next;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(next) = wrap_index(self.item_idx, len, -1) {
                    self.item_idx = next;
                }
            }
            KeyCode::Char(' ') => {
                if let Some((list_id, item_id)) = self.selected_shopping_item() {
                    let result = self.state.toggle_shopping_item(&list_id, &item_id);
                    self.report(result, "Item updated");
                }
            }
            KeyCode::Char('x') => {
                if let Some((list_id, item_id)) = self.selected_shopping_item() {
                    let result = self.state.remove_shopping_item(&list_id, &item_id);
                    self.report(result, "Item removed");
                }
            }
            KeyCode::Char('a') => self.open_prompt(PromptKind::AddShoppingItem, String::new()),
            KeyCode::Char('c') => {
                self.quick_category = self.quick_category.next();
                self.set_status(format!("Quick add: {}", self.quick_category));
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let idx = digit as usize - '1' as usize;
                if let Some(suggestion) = self.quick_category.suggestions().get(idx) {
                    let item = NewShoppingItem {
                        name: (*suggestion).to_string(),
                        quantity: None,
                        category: self.quick_category,
                    };
                    let result = self.state.add_shopping_item(&list_id, item);
                    self.report(result, &format!("Added {suggestion}"));
                }
            }
            KeyCode::Char('r') => self.open_prompt(PromptKind::RenameShoppingList, name),
            KeyCode::Char('D') => {
                self.mode = InputMode::Confirm(PendingDelete::ShoppingList(list_id));
            }
            KeyCode::Esc => {
                self.open_list = None;
                self.screen = Screen::ShoppingLists;
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                return;
            }
            KeyCode::Enter => {
                if let InputMode::Prompt(prompt) =
                    std::mem::replace(&mut self.mode, InputMode::Normal)
                {
                    self.submit_prompt(prompt);
                }
                return;
            }
            _ => {}
        }

        let InputMode::Prompt(prompt) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Tab if prompt.kind == PromptKind::AddShoppingItem => {
                prompt.category = prompt.category.next();
            }
            KeyCode::Char(c) => prompt.input.push(c),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let InputMode::Confirm(pending) = std::mem::replace(&mut self.mode, InputMode::Normal)
        else {
            return;
        };
        if !matches!(key.code, KeyCode::Char('y') | KeyCode::Enter) {
            self.set_status("Kept");
            return;
        }

        match pending {
            PendingDelete::Project(id) => {
                let result = self.state.delete_project(&id);
                if self.report(result, "Project deleted").is_some() {
                    self.open_project = None;
                    self.screen = Screen::Projects;
                }
            }
            PendingDelete::ShoppingList(id) => {
                let result = self.state.delete_shopping_list(&id);
                if self.report(result, "Shopping list deleted").is_some() {
                    self.open_list = None;
                    self.screen = Screen::ShoppingLists;
                }
            }
        }
        self.clamp_selection();
    }

    // ── Actions ────────────────────────────────────────────────────

    fn open_prompt(&mut self, kind: PromptKind, input: String) {
        self.mode = InputMode::Prompt(Prompt {
            kind,
            input,
            category: self.quick_category,
        });
    }

    fn open_user_select(&mut self) {
        self.user_idx = self
            .state
            .current_user()
            .and_then(|u| FAMILY_MEMBERS.iter().position(|m| *m == u.name))
            .unwrap_or(0);
        self.screen = Screen::UserSelect;
    }

    fn select_user(&mut self, name: &str) {
        let result = self.state.select_user(name).map(|u| u.name.clone());
        if let Some(name) = self.report(result, "User selected") {
            self.set_status(format!("Hej {name}!"));
            self.screen = Screen::Home;
        }
    }

    fn reload(&mut self) {
        match self.state.load() {
            DataSource::Cache => self.set_error("Store unreachable, showing cached data"),
            _ => self.set_status("Reloaded"),
        }
        self.clamp_selection();
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        let Prompt {
            kind,
            input,
            category,
        } = prompt;

        match kind {
            PromptKind::CustomUser => self.select_user(&input),
            PromptKind::NewProject => {
                let result = self.state.create_project(&input, "", &[]);
                if let Some(project) = self.report(result, "Project created") {
                    self.open_project = Some(project.id);
                    self.item_idx = 0;
                    self.screen = Screen::ProjectDetail;
                }
            }
            PromptKind::EditTitle => {
                let description = self
                    .current_project()
                    .map(|p| p.description.clone())
                    .unwrap_or_default();
                self.open_prompt(PromptKind::EditDescription { title: input }, description);
            }
            PromptKind::EditDescription { title } => {
                if let Some(id) = self.open_project.clone() {
                    let result = self.state.edit_project(&id, &title, &input);
                    self.report(result, "Project saved");
                }
            }
            PromptKind::AddChecklistItem => {
                if let Some(id) = self.open_project.clone() {
                    let result = self.state.add_checklist_item(&id, &input);
                    self.report(result, "Item added");
                }
            }
            PromptKind::AddComment => {
                if let Some(id) = self.open_project.clone() {
                    let result = self.state.add_comment(&id, &input);
                    self.report(result, "Comment added");
                }
            }
            PromptKind::NewShoppingList => {
                let result = self.state.create_shopping_list(&input, Vec::new());
                if let Some(list) = self.report(result, "Shopping list created") {
                    self.open_list = Some(list.id);
                    self.item_idx = 0;
                    self.screen = Screen::ShoppingDetail;
                }
            }
            PromptKind::RenameShoppingList => {
                if let Some(id) = self.open_list.clone() {
                    let result = self.state.rename_shopping_list(&id, &input);
                    self.report(result, "Shopping list renamed");
                }
            }
            PromptKind::AddShoppingItem => {
                if let Some(id) = self.open_list.clone() {
                    let item = parse_item_input(&input, category);
                    let result = self.state.add_shopping_item(&id, item);
                    self.report(result, "Item added");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalCache;
    use crate::db::{Database, open_temp_db};
    use tempfile::TempDir;

    struct Harness {
        app: App<Database>,
        _db_dir: TempDir,
        _cache_dir: TempDir,
    }

    fn harness(user: Option<&str>) -> Harness {
        let (db, db_dir) = open_temp_db();
        let cache_dir = TempDir::new().unwrap();
        let mut state = AppState::new(db, LocalCache::new(cache_dir.path()));
        state.load();
        if let Some(name) = user {
            state.select_user(name).unwrap();
        }
        Harness {
            app: App::new(state),
            _db_dir: db_dir,
            _cache_dir: cache_dir,
        }
    }

    fn press(app: &mut App<Database>, code: KeyCode) {
        app.handle_key(KeyEvent::from(code));
    }

    fn keys(app: &mut App<Database>, chars: &str) {
        for c in chars.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Types `text` into the open prompt and submits it.
    fn enter_text(app: &mut App<Database>, text: &str) {
        assert!(matches!(app.mode, InputMode::Prompt(_)), "no prompt open");
        keys(app, text);
        press(app, KeyCode::Enter);
    }

    fn project_in_detail(h: &mut Harness, title: &str) -> String {
        keys(&mut h.app, "1n");
        enter_text(&mut h.app, title);
        assert_eq!(h.app.screen, Screen::ProjectDetail);
        h.app.open_project.clone().unwrap()
    }

    fn list_in_detail(h: &mut Harness, name: &str) -> String {
        keys(&mut h.app, "2n");
        enter_text(&mut h.app, name);
        assert_eq!(h.app.screen, Screen::ShoppingDetail);
        h.app.open_list.clone().unwrap()
    }

    #[test]
    fn starts_on_user_select_without_user() {
        let h = harness(None);
        assert_eq!(h.app.screen, Screen::UserSelect);
        assert_eq!(h.app.mode, InputMode::Normal);
    }

    #[test]
    fn starts_on_home_with_user() {
        let h = harness(Some("Jan"));
        assert_eq!(h.app.screen, Screen::Home);
    }

    #[test]
    fn enter_selects_family_member() {
        let mut h = harness(None);
        keys(&mut h.app, "jj");
        press(&mut h.app, KeyCode::Enter);
        assert_eq!(h.app.screen, Screen::Home);
        assert_eq!(h.app.state.current_user().unwrap().name, FAMILY_MEMBERS[2]);
        assert_eq!(
            h.app.state.cache().load_user().unwrap().name,
            FAMILY_MEMBERS[2]
        );
    }

    #[test]
    fn last_choice_prompts_for_custom_name() {
        let mut h = harness(None);
        press(&mut h.app, KeyCode::Char('k'));
        assert_eq!(h.app.user_idx, FAMILY_MEMBERS.len());
        press(&mut h.app, KeyCode::Enter);
        enter_text(&mut h.app, "Moster Anna");
        assert_eq!(h.app.state.current_user().unwrap().name, "Moster Anna");
        assert_eq!(h.app.screen, Screen::Home);
    }

    #[test]
    fn esc_on_user_select_needs_a_user() {
        let mut h = harness(None);
        press(&mut h.app, KeyCode::Esc);
        assert_eq!(h.app.screen, Screen::UserSelect);

        let mut h = harness(Some("Eva"));
        press(&mut h.app, KeyCode::Char('u'));
        assert_eq!(h.app.screen, Screen::UserSelect);
        assert_eq!(h.app.user_idx, 2);
        press(&mut h.app, KeyCode::Esc);
        assert_eq!(h.app.screen, Screen::Home);
    }

    #[test]
    fn q_quits_but_is_typed_in_prompt() {
        let mut h = harness(Some("Eva"));
        keys(&mut h.app, "1n");
        keys(&mut h.app, "q");
        assert!(h.app.running);
        let InputMode::Prompt(prompt) = &h.app.mode else {
            panic!("prompt closed");
        };
        assert_eq!(prompt.input, "q");

        press(&mut h.app, KeyCode::Esc);
        assert_eq!(h.app.mode, InputMode::Normal);
        keys(&mut h.app, "q");
        assert!(!h.app.running);
    }

    #[test]
    fn new_project_opens_detail() {
        let mut h = harness(Some("Eva"));
        let id = project_in_detail(&mut h, "Altan");
        assert_eq!(h.app.state.project(&id).unwrap().title, "Altan");
        assert_eq!(h.app.status.as_ref().unwrap().text, "Project created");
    }

    #[test]
    fn blank_title_shows_error() {
        let mut h = harness(Some("Eva"));
        keys(&mut h.app, "1n");
        press(&mut h.app, KeyCode::Enter);
        let status = h.app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("title must not be empty"));
        assert_eq!(h.app.screen, Screen::Projects);
        assert!(h.app.state.projects().is_empty());
    }

    #[test]
    fn checklist_toggle_and_remove() {
        let mut h = harness(Some("Eva"));
        let id = project_in_detail(&mut h, "Staket");
        press(&mut h.app, KeyCode::Char('a'));
        enter_text(&mut h.app, "Köp färg");
        press(&mut h.app, KeyCode::Char('a'));
        enter_text(&mut h.app, "Måla");

        press(&mut h.app, KeyCode::Char(' '));
        assert_eq!(h.app.state.project(&id).unwrap().progress, 50);

        press(&mut h.app, KeyCode::Char('j'));
        press(&mut h.app, KeyCode::Char(' '));
        assert_eq!(h.app.state.project(&id).unwrap().progress, 100);

        press(&mut h.app, KeyCode::Char('x'));
        let project = h.app.state.project(&id).unwrap();
        assert_eq!(project.checklist.len(), 1);
        assert_eq!(project.checklist[0].text, "Köp färg");
        assert_eq!(h.app.item_idx, 0);
    }

    #[test]
    fn comment_and_edit() {
        let mut h = harness(Some("Hanna"));
        let id = project_in_detail(&mut h, "Bastu");
        press(&mut h.app, KeyCode::Char('c'));
        enter_text(&mut h.app, "Bra idé");
        assert_eq!(h.app.state.project(&id).unwrap().comments[0].author, "Hanna");

        press(&mut h.app, KeyCode::Char('e'));
        let InputMode::Prompt(prompt) = &h.app.mode else {
            panic!("edit prompt not open");
        };
        assert_eq!(prompt.input, "Bastu");
        keys(&mut h.app, " vid sjön");
        press(&mut h.app, KeyCode::Enter);
        enter_text(&mut h.app, "Vedeldad");

        let project = h.app.state.project(&id).unwrap();
        assert_eq!(project.title, "Bastu vid sjön");
        assert_eq!(project.description, "Vedeldad");
    }

    #[test]
    fn sort_cycles_and_orders_list() {
        let mut h = harness(Some("Eva"));
        for title in ["b", "A", "c"] {
            keys(&mut h.app, "1n");
            enter_text(&mut h.app, title);
            press(&mut h.app, KeyCode::Esc);
            press(&mut h.app, KeyCode::Esc);
        }
        keys(&mut h.app, "1");
        assert_eq!(h.app.sort, ProjectSort::Date);
        keys(&mut h.app, "ss");
        assert_eq!(h.app.sort, ProjectSort::Title);
        let titles: Vec<&str> = h
            .app
            .visible_projects()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, ["A", "b", "c"]);
        keys(&mut h.app, "s");
        assert_eq!(h.app.sort, ProjectSort::Date);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut h = harness(Some("Eva"));
        let id = project_in_detail(&mut h, "Doomed");

        press(&mut h.app, KeyCode::Char('D'));
        assert_eq!(
            h.app.mode,
            InputMode::Confirm(PendingDelete::Project(id.clone()))
        );
        press(&mut h.app, KeyCode::Char('n'));
        assert!(h.app.state.project(&id).is_some());
        assert_eq!(h.app.screen, Screen::ProjectDetail);

        press(&mut h.app, KeyCode::Char('D'));
        press(&mut h.app, KeyCode::Char('y'));
        assert!(h.app.state.project(&id).is_none());
        assert_eq!(h.app.screen, Screen::Projects);
        assert!(h.app.open_project.is_none());
    }

    #[test]
    fn shopping_item_with_category_and_quantity() {
        let mut h = harness(Some("Gustav"));
        let id = list_in_detail(&mut h, "Vecka");

        press(&mut h.app, KeyCode::Char('a'));
        // Övrigt -> Kött & Fisk -> Mejeri
        press(&mut h.app, KeyCode::Tab);
        press(&mut h.app, KeyCode::Tab);
        enter_text(&mut h.app, "Mjölk, 2 l");

        let list = h.app.state.shopping_list(&id).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name, "Mjölk");
        assert_eq!(list.items[0].quantity.as_deref(), Some("2 l"));
        assert_eq!(list.items[0].category, ShoppingCategory::Dairy);
        assert_eq!(list.items[0].added_by, "Gustav");
    }

    #[test]
    fn quick_add_uses_selected_category() {
        let mut h = harness(Some("Eva"));
        let id = list_in_detail(&mut h, "Helg");
        press(&mut h.app, KeyCode::Char('c'));
        assert_eq!(h.app.quick_category, ShoppingCategory::MeatAndFish);
        press(&mut h.app, KeyCode::Char('2'));
        press(&mut h.app, KeyCode::Char('9'));

        let list = h.app.state.shopping_list(&id).unwrap();
        assert_eq!(list.items.len(), 1, "no ninth suggestion");
        assert_eq!(list.items[0].name, "Lax");
        assert_eq!(list.items[0].category, ShoppingCategory::MeatAndFish);
    }

    #[test]
    fn shopping_rows_follow_category_order() {
        let mut h = harness(Some("Eva"));
        let id = list_in_detail(&mut h, "Blandat");
        press(&mut h.app, KeyCode::Char('a'));
        enter_text(&mut h.app, "Ljus");
        press(&mut h.app, KeyCode::Char('c'));
        press(&mut h.app, KeyCode::Char('1'));

        let names: Vec<&str> = h.app.shopping_rows().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Kyckling", "Ljus"]);

        press(&mut h.app, KeyCode::Char('j'));
        press(&mut h.app, KeyCode::Char(' '));
        let list = h.app.state.shopping_list(&id).unwrap();
        let candle = list.items.iter().find(|i| i.name == "Ljus").unwrap();
        assert!(candle.completed);
    }

    #[test]
    fn rename_and_delete_list() {
        let mut h = harness(Some("Eva"));
        let id = list_in_detail(&mut h, "Gammal");
        press(&mut h.app, KeyCode::Char('r'));
        for _ in 0.."Gammal".len() {
            press(&mut h.app, KeyCode::Backspace);
        }
        enter_text(&mut h.app, "Ny");
        assert_eq!(h.app.state.shopping_list(&id).unwrap().name, "Ny");

        press(&mut h.app, KeyCode::Char('D'));
        press(&mut h.app, KeyCode::Enter);
        assert!(h.app.state.shopping_lists().is_empty());
        assert_eq!(h.app.screen, Screen::ShoppingLists);
    }

    #[test]
    fn parse_item_input_splits_quantity() {
        let item = parse_item_input(" Ägg , 12 st ", ShoppingCategory::Dairy);
        assert_eq!(item.name, "Ägg");
        assert_eq!(item.quantity.as_deref(), Some("12 st"));

        let item = parse_item_input("Bröd,", ShoppingCategory::DryGoods);
        assert_eq!(item.name, "Bröd");
        assert!(item.quantity.is_none());
    }

    #[test]
    fn wrap_index_handles_empty_and_wraps() {
        assert_eq!(wrap_index(0, 0, 1), None);
        assert_eq!(wrap_index(2, 3, 1), Some(0));
        assert_eq!(wrap_index(0, 3, -1), Some(2));
    }
}
