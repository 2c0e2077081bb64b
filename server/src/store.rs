//! In-process todo collection.
//!
//! # Design
//! `TodoStore` is plain synchronous data: an insertion-ordered `Vec<Todo>`
//! plus the id counter. Sharing and locking live one level up in
//! [`SharedStore`], so every operation here can be tested without a runtime.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;

pub type TodoId = u64;

/// Store handle passed to every handler through axum state.
pub type SharedStore = Arc<RwLock<TodoStore>>;

/// A single todo item, as served over HTTP and written to the backing file.
///
/// Absent fields are omitted from the JSON form rather than written as `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// How `create` picks the id of a new todo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdPolicy {
    /// Counter that only moves forward; ids are never reused.
    #[default]
    Monotonic,
    /// `len + 1`. Collides with a live id once anything but the last todo
    /// has been deleted.
    Legacy,
}

#[derive(Debug)]
pub struct TodoStore {
    todos: Vec<Todo>,
    /// `None` once `TodoId::MAX` has been handed out or loaded.
    next_id: Option<TodoId>,
    policy: IdPolicy,
}

impl TodoStore {
    pub fn new(policy: IdPolicy) -> Self {
        Self::from_todos(Vec::new(), policy)
    }

    /// Builds a store over previously persisted todos. The counter starts
    /// past the largest loaded id.
    pub fn from_todos(todos: Vec<Todo>, policy: IdPolicy) -> Self {
        let next_id = todos.iter().map(|t| t.id).max().unwrap_or(0).checked_add(1);
        Self {
            todos,
            next_id,
            policy,
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn list(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: TodoId) -> Result<&Todo, StoreError> {
        self.todos
            .iter()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound)
    }

    /// Fails only when the monotonic counter has run out of ids.
    pub fn create(
        &mut self,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Todo, StoreError> {
        let id = self.assign_id()?;
        let todo = Todo {
            id,
            title,
            description,
            completed: Some(false),
        };
        self.todos.push(todo.clone());
        Ok(todo)
    }

    /// Replaces all three mutable fields. Anything passed as `None` ends up
    /// absent on the stored todo.
    pub fn update(
        &mut self,
        id: TodoId,
        title: Option<String>,
        description: Option<String>,
        completed: Option<bool>,
    ) -> Result<Todo, StoreError> {
        let todo = self
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound)?;
        todo.title = title;
        todo.description = description;
        todo.completed = completed;
        Ok(todo.clone())
    }

    pub fn delete(&mut self, id: TodoId) -> Result<Todo, StoreError> {
        let index = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound)?;
        Ok(self.todos.remove(index))
    }

    fn assign_id(&mut self) -> Result<TodoId, StoreError> {
        match self.policy {
            IdPolicy::Legacy => Ok(self.todos.len() as TodoId + 1),
            IdPolicy::Monotonic => {
                let id = self.next_id.ok_or(StoreError::IdsExhausted)?;
                self.next_id = id.checked_add(1);
                Ok(id)
            }
        }
    }
}

/// Parses a path segment the lenient way: optional leading whitespace and
/// sign, then as many digits as are present. `"12abc"` is 12.
///
/// Returns `None` when there are no leading digits or the value is negative,
/// which the handlers treat as an id that matches nothing.
pub fn parse_id(raw: &str) -> Option<TodoId> {
    let rest = raw.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || negative {
        return None;
    }
    rest[..digits].parse().ok()
}
