//! Data-access boundary between the application state and the store.
//!
//! [`RemoteStore`] is the fallible CRUD surface of the backing datastore.
//! [`DataAccess`] wraps it with the contract the interfaces rely on: reads
//! degrade to an empty result, creates and updates to `None`, deletes to
//! `false`. Every failure is logged here and goes no further.

use anyhow::Result;
use tracing::{debug, error, warn};

use crate::db::{self, Database};
use crate::models::{
    CreateProjectInput, CreateShoppingListInput, Project, ShoppingList, UpdateProjectInput,
    UpdateShoppingListInput,
};

pub trait RemoteStore {
    fn fetch_projects(&self) -> Result<Vec<Project>>;
    fn insert_project(&self, input: CreateProjectInput) -> Result<Project>;
    fn patch_project(&self, id: &str, input: UpdateProjectInput) -> Result<Project>;
    /// Returns whether a record was removed.
    fn remove_project(&self, id: &str) -> Result<bool>;

    fn fetch_shopping_lists(&self) -> Result<Vec<ShoppingList>>;
    fn insert_shopping_list(&self, input: CreateShoppingListInput) -> Result<ShoppingList>;
    fn patch_shopping_list(&self, id: &str, input: UpdateShoppingListInput)
    -> Result<ShoppingList>;
    fn remove_shopping_list(&self, id: &str) -> Result<bool>;
}

impl RemoteStore for Database {
    fn fetch_projects(&self) -> Result<Vec<Project>> {
        db::project::list_projects(self)
    }

    fn insert_project(&self, input: CreateProjectInput) -> Result<Project> {
        db::project::create_project(self, input)
    }

    fn patch_project(&self, id: &str, input: UpdateProjectInput) -> Result<Project> {
        db::project::update_project(self, id, input)
    }

    fn remove_project(&self, id: &str) -> Result<bool> {
        db::project::delete_project(self, id)
    }

    fn fetch_shopping_lists(&self) -> Result<Vec<ShoppingList>> {
        db::shopping::list_shopping_lists(self)
    }

    fn insert_shopping_list(&self, input: CreateShoppingListInput) -> Result<ShoppingList> {
        db::shopping::create_shopping_list(self, input)
    }

    fn patch_shopping_list(
        &self,
        id: &str,
        input: UpdateShoppingListInput,
    ) -> Result<ShoppingList> {
        db::shopping::update_shopping_list(self, id, input)
    }

    fn remove_shopping_list(&self, id: &str) -> Result<bool> {
        db::shopping::delete_shopping_list(self, id)
    }
}

/// A store that may have failed to open. While unavailable every call fails
/// with the open error, so the state runs from the cache mirror.
pub enum Store<S> {
    Ready(S),
    Unavailable(String),
}

impl<S> Store<S> {
    pub fn connect(open: impl FnOnce() -> Result<S>) -> Self {
        match open() {
            Ok(store) => Self::Ready(store),
            Err(e) => {
                warn!("store unavailable: {e:#}");
                Self::Unavailable(format!("{e:#}"))
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    fn get(&self) -> Result<&S> {
        match self {
            Self::Ready(store) => Ok(store),
            Self::Unavailable(reason) => anyhow::bail!("store unavailable: {reason}"),
        }
    }
}

impl<S: RemoteStore> RemoteStore for Store<S> {
    fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.get()?.fetch_projects()
    }

    fn insert_project(&self, input: CreateProjectInput) -> Result<Project> {
        self.get()?.insert_project(input)
    }

    fn patch_project(&self, id: &str, input: UpdateProjectInput) -> Result<Project> {
        self.get()?.patch_project(id, input)
    }

    fn remove_project(&self, id: &str) -> Result<bool> {
        self.get()?.remove_project(id)
    }

    fn fetch_shopping_lists(&self) -> Result<Vec<ShoppingList>> {
        self.get()?.fetch_shopping_lists()
    }

    fn insert_shopping_list(&self, input: CreateShoppingListInput) -> Result<ShoppingList> {
        self.get()?.insert_shopping_list(input)
    }

    fn patch_shopping_list(
        &self,
        id: &str,
        input: UpdateShoppingListInput,
    ) -> Result<ShoppingList> {
        self.get()?.patch_shopping_list(id, input)
    }

    fn remove_shopping_list(&self, id: &str) -> Result<bool> {
        self.get()?.remove_shopping_list(id)
    }
}

pub struct DataAccess<S> {
    store: S,
}

impl<S: RemoteStore> DataAccess<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn into_store(self) -> S {
        self.store
    }

    #[cfg(test)]
    pub(crate) fn list_projects(&self) -> Vec<Project> {
        self.try_list_projects().unwrap_or_else(|e| {
            error!("error fetching projects: {e:#}");
            Vec::new()
        })
    }

    /// Keeps the failure, so a load can tell "empty" from "unreachable".
    pub fn try_list_projects(&self) -> Result<Vec<Project>> {
        self.store.fetch_projects()
    }

    pub fn create_project(&self, input: CreateProjectInput) -> Option<Project> {
        self.store
            .insert_project(input)
            .inspect_err(|e| error!("error creating project: {e:#}"))
            .ok()
    }

    pub fn update_project(&self, id: &str, input: UpdateProjectInput) -> Option<Project> {
        self.store
            .patch_project(id, input)
            .inspect_err(|e| error!(%id, "error updating project: {e:#}"))
            .ok()
    }

    pub fn delete_project(&self, id: &str) -> bool {
        match self.store.remove_project(id) {
            Ok(removed) => {
                if !removed {
                    debug!(%id, "delete matched no project");
                }
                true
            }
            Err(e) => {
                error!(%id, "error deleting project: {e:#}");
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn list_shopping_lists(&self) -> Vec<ShoppingList> {
        self.try_list_shopping_lists().unwrap_or_else(|e| {
            error!("error fetching shopping lists: {e:#}");
            Vec::new()
        })
    }

    pub fn try_list_shopping_lists(&self) -> Result<Vec<ShoppingList>> {
        self.store.fetch_shopping_lists()
    }

    pub fn create_shopping_list(&self, input: CreateShoppingListInput) -> Option<ShoppingList> {
        self.store
            .insert_shopping_list(input)
            .inspect_err(|e| error!("error creating shopping list: {e:#}"))
            .ok()
    }

    pub fn update_shopping_list(
        &self,
        id: &str,
        input: UpdateShoppingListInput,
    ) -> Option<ShoppingList> {
        self.store
            .patch_shopping_list(id, input)
            .inspect_err(|e| error!(%id, "error updating shopping list: {e:#}"))
            .ok()
    }

    pub fn delete_shopping_list(&self, id: &str) -> bool {
        match self.store.remove_shopping_list(id) {
            Ok(removed) => {
                if !removed {
                    debug!(%id, "delete matched no shopping list");
                }
                true
            }
            Err(e) => {
                error!(%id, "error deleting shopping list: {e:#}");
                false
            }
        }
    }
}
