//! Application state shared by the terminal UI and the tool server.
//!
//! Holds the selected user and both collections in memory. Every change to
//! a collection is written through to the [`LocalCache`] mirror; the store is
//! only touched through [`DataAccess`].

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cache::LocalCache;
use crate::models::{
    ChecklistItem, Comment, CreateProjectInput, CreateShoppingListInput, NewShoppingItem,
    Project, ShoppingItem, ShoppingList, UpdateProjectInput, UpdateShoppingListInput, User,
};
use crate::store::{DataAccess, RemoteStore};
use crate::views::checklist_progress;

/// Where the collections shown right now came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Nothing loaded yet.
    Empty,
    Remote,
    /// The store was unreachable and the cache mirror was used.
    Cache,
}

pub struct AppState<S> {
    data: DataAccess<S>,
    cache: LocalCache,
    current_user: Option<User>,
    projects: Vec<Project>,
    shopping_lists: Vec<ShoppingList>,
    source: DataSource,
}

fn required_text(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        anyhow::bail!("{what} must not be empty");
    }
    Ok(value.to_string())
}

impl<S: RemoteStore> AppState<S> {
    pub fn new(store: S, cache: LocalCache) -> Self {
        Self {
            data: DataAccess::new(store),
            cache,
            current_user: None,
            projects: Vec::new(),
            shopping_lists: Vec::new(),
            source: DataSource::Empty,
        }
    }

    #[cfg(test)]
    pub(crate) fn data(&self) -> &DataAccess<S> {
        &self.data
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn shopping_lists(&self) -> &[ShoppingList] {
        &self.shopping_lists
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn shopping_list(&self, id: &str) -> Option<&ShoppingList> {
        self.shopping_lists.iter().find(|l| l.id == id)
    }

    // ── Loading ────────────────────────────────────────────────────

    /// Restores the user from the cache and pulls both collections from the
    /// store. If the store read fails, the cached snapshots are used instead.
    pub fn load(&mut self) -> DataSource {
        if let Some(user) = self.cache.load_user() {
            self.current_user = Some(user);
        }

        let remote = self
            .data
            .try_list_projects()
            .and_then(|projects| Ok((projects, self.data.try_list_shopping_lists()?)));

        match remote {
            Ok((projects, lists)) => {
                info!(
                    projects = projects.len(),
                    shopping_lists = lists.len(),
                    "loaded data from store"
                );
                self.projects = projects;
                self.shopping_lists = lists;
                self.source = DataSource::Remote;
            }
            Err(e) => {
                warn!("error loading data, falling back to local cache: {e:#}");
                self.projects = match self.cache.load_projects() {
                    Ok(cached) => cached.unwrap_or_default(),
                    Err(e) => {
                        warn!("error loading cached projects: {e:#}");
                        Vec::new()
                    }
                };
                self.shopping_lists = match self.cache.load_shopping_lists() {
                    Ok(cached) => cached.unwrap_or_default(),
                    Err(e) => {
                        warn!("error loading cached shopping lists: {e:#}");
                        Vec::new()
                    }
                };
                self.source = DataSource::Cache;
            }
        }

        self.sync_projects();
        self.sync_shopping_lists();
        self.source
    }

    fn sync_projects(&self) {
        if let Err(e) = self.cache.store_projects(&self.projects) {
            warn!("failed to mirror projects to cache: {e:#}");
        }
    }

    fn sync_shopping_lists(&self) {
        if let Err(e) = self.cache.store_shopping_lists(&self.shopping_lists) {
            warn!("failed to mirror shopping lists to cache: {e:#}");
        }
    }

    // ── Identity ───────────────────────────────────────────────────

    pub fn select_user(&mut self, name: &str) -> Result<&User> {
        let user = User::new(name)?;
        self.cache
            .store_user(Some(&user))
            .context("failed to save selected user")?;
        info!(user = %user.name, "user selected");
        Ok(self.current_user.insert(user))
    }

    pub fn clear_user(&mut self) -> Result<()> {
        self.cache
            .store_user(None)
            .context("failed to clear selected user")?;
        self.current_user = None;
        Ok(())
    }

    fn require_user(&self) -> Result<String> {
        self.current_user
            .as_ref()
            .map(|u| u.name.clone())
            .context("select a user first")
    }

    // ── Projects ───────────────────────────────────────────────────

    pub fn create_project(
        &mut self,
        title: &str,
        description: &str,
        checklist: &[String],
    ) -> Result<Project> {
        self.require_user()?;
        let title = required_text(title, "title")?;
        let checklist: Vec<ChecklistItem> = checklist
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(ChecklistItem::new)
            .collect();

        let project = self
            .data
            .create_project(CreateProjectInput {
                title,
                description: description.trim().to_string(),
                progress: checklist_progress(&checklist),
                checklist,
                comments: Vec::new(),
            })
            .context("failed to create project")?;

        self.projects.insert(0, project.clone());
        self.sync_projects();
        Ok(project)
    }

    fn apply_project_update(&mut self, id: &str, input: UpdateProjectInput) -> Result<Project> {
        let updated = self
            .data
            .update_project(id, input)
            .context("failed to update project")?;

        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == id) {
            *slot = updated.clone();
        }
        self.sync_projects();
        Ok(updated)
    }

    fn existing_project(&self, id: &str) -> Result<&Project> {
        self.project(id)
            .with_context(|| format!("project not found: {id}"))
    }

    pub fn edit_project(&mut self, id: &str, title: &str, description: &str) -> Result<Project> {
        self.require_user()?;
        self.existing_project(id)?;
        let title = required_text(title, "title")?;
        self.apply_project_update(
            id,
            UpdateProjectInput {
                title: Some(title),
                description: Some(description.trim().to_string()),
                ..Default::default()
            },
        )
    }

    pub fn delete_project(&mut self, id: &str) -> Result<()> {
        self.require_user()?;
        self.existing_project(id)?;
        if !self.data.delete_project(id) {
            anyhow::bail!("failed to delete project");
        }
        self.projects.retain(|p| p.id != id);
        self.sync_projects();
        Ok(())
    }

    /// Writes a new checklist together with its recomputed progress.
    fn replace_checklist(&mut self, id: &str, checklist: Vec<ChecklistItem>) -> Result<Project> {
        let progress = checklist_progress(&checklist);
        self.apply_project_update(
            id,
            UpdateProjectInput {
                checklist: Some(checklist),
                progress: Some(progress),
                ..Default::default()
            },
        )
    }

    pub fn add_checklist_item(&mut self, project_id: &str, text: &str) -> Result<Project> {
        self.require_user()?;
        let text = required_text(text, "checklist item")?;
        let mut checklist = self.existing_project(project_id)?.checklist.clone();
        checklist.push(ChecklistItem::new(text));
        self.replace_checklist(project_id, checklist)
    }

    pub fn toggle_checklist_item(&mut self, project_id: &str, item_id: &str) -> Result<Project> {
        self.require_user()?;
        let mut checklist = self.existing_project(project_id)?.checklist.clone();
        let item = checklist
            .iter_mut()
            .find(|item| item.id == item_id)
            .with_context(|| format!("checklist item not found: {item_id}"))?;
        item.completed = !item.completed;
        self.replace_checklist(project_id, checklist)
    }

    pub fn remove_checklist_item(&mut self, project_id: &str, item_id: &str) -> Result<Project> {
        self.require_user()?;
        let mut checklist = self.existing_project(project_id)?.checklist.clone();
        let before = checklist.len();
        checklist.retain(|item| item.id != item_id);
        if checklist.len() == before {
            anyhow::bail!("checklist item not found: {item_id}");
        }
        self.replace_checklist(project_id, checklist)
    }

    pub fn add_comment(&mut self, project_id: &str, text: &str) -> Result<Project> {
        let author = self.require_user()?;
        let text = required_text(text, "comment")?;
        let mut comments = self.existing_project(project_id)?.comments.clone();
        comments.push(Comment::new(author, text));
        self.apply_project_update(
            project_id,
            UpdateProjectInput {
                comments: Some(comments),
                ..Default::default()
            },
        )
    }

    // ── Shopping lists ─────────────────────────────────────────────

    fn stamp_item(added_by: &str, input: NewShoppingItem) -> Result<ShoppingItem> {
        let name = required_text(&input.name, "item name")?;
        let quantity = input
            .quantity
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        Ok(ShoppingItem::new(
            NewShoppingItem {
                name,
                quantity,
                category: input.category,
            },
            added_by,
        ))
    }

    pub fn create_shopping_list(
        &mut self,
        name: &str,
        items: Vec<NewShoppingItem>,
    ) -> Result<ShoppingList> {
        let author = self.require_user()?;
        let name = required_text(name, "list name")?;
        let items = items
            .into_iter()
            .map(|item| Self::stamp_item(&author, item))
            .collect::<Result<Vec<_>>>()?;

        let list = self
            .data
            .create_shopping_list(CreateShoppingListInput { name, items })
            .context("failed to create shopping list")?;

        self.shopping_lists.insert(0, list.clone());
        self.sync_shopping_lists();
        Ok(list)
    }

    fn apply_list_update(&mut self, id: &str, input: UpdateShoppingListInput) -> Result<ShoppingList> {
        let updated = self
            .data
            .update_shopping_list(id, input)
            .context("failed to update shopping list")?;

        if let Some(slot) = self.shopping_lists.iter_mut().find(|l| l.id == id) {
            *slot = updated.clone();
        }
        self.sync_shopping_lists();
        Ok(updated)
    }

    fn existing_list(&self, id: &str) -> Result<&ShoppingList> {
        self.shopping_list(id)
            .with_context(|| format!("shopping list not found: {id}"))
    }

    pub fn rename_shopping_list(&mut self, id: &str, name: &str) -> Result<ShoppingList> {
        self.require_user()?;
        self.existing_list(id)?;
        let name = required_text(name, "list name")?;
        self.apply_list_update(
            id,
            UpdateShoppingListInput {
                name: Some(name),
                ..Default::default()
            },
        )
    }

    pub fn delete_shopping_list(&mut self, id: &str) -> Result<()> {
        self.require_user()?;
        self.existing_list(id)?;
        if !self.data.delete_shopping_list(id) {
            anyhow::bail!("failed to delete shopping list");
        }
        self.shopping_lists.retain(|l| l.id != id);
        self.sync_shopping_lists();
        Ok(())
    }

    fn replace_items(&mut self, id: &str, items: Vec<ShoppingItem>) -> Result<ShoppingList> {
        self.apply_list_update(
            id,
            UpdateShoppingListInput {
                items: Some(items),
                ..Default::default()
            },
        )
    }

    pub fn add_shopping_item(&mut self, list_id: &str, input: NewShoppingItem) -> Result<ShoppingList> {
        let author = self.require_user()?;
        let item = Self::stamp_item(&author, input)?;
        let mut items = self.existing_list(list_id)?.items.clone();
        items.push(item);
        self.replace_items(list_id, items)
    }

    pub fn toggle_shopping_item(&mut self, list_id: &str, item_id: &str) -> Result<ShoppingList> {
        self.require_user()?;
        let mut items = self.existing_list(list_id)?.items.clone();
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .with_context(|| format!("shopping item not found: {item_id}"))?;
        item.completed = !item.completed;
        self.replace_items(list_id, items)
    }

    pub fn remove_shopping_item(&mut self, list_id: &str, item_id: &str) -> Result<ShoppingList> {
        self.require_user()?;
        let mut items = self.existing_list(list_id)?.items.clone();
        let before = items.len();
        items.retain(|item| item.id != item_id);
        if items.len() == before {
            anyhow::bail!("shopping item not found: {item_id}");
        }
        self.replace_items(list_id, items)
    }
}
