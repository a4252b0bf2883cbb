//! Todo items and the repository that persists them.
//!
//! The repository is a direct translation of list/create/update/delete onto
//! `sea-orm` calls. It performs no validation or recovery of its own; store
//! errors are surfaced as [`TodoError::StoreUnavailable`] and missing rows as
//! [`TodoError::NotFound`].

use crate::entities::todo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod api;

/// Identifier of a persisted todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TodoId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Todo {
    id: TodoId,
    name: String,
    description: String,
    status: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(
        id: TodoId,
        name: String,
        description: String,
        status: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            status,
            created_at,
            updated_at,
        }
    }

    /// Returns the ID of the todo.
    pub fn id(&self) -> TodoId {
        self.id
    }

    /// Returns the short label of the todo.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns `true` once the todo is completed.
    pub fn status(&self) -> bool {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<todo::Model> for Todo {
    fn from(model: todo::Model) -> Self {
        Todo::new(
            TodoId::new(model.id),
            model.name,
            model.description,
            model.status,
            model.created_at,
            model.updated_at,
        )
    }
}

/// Fields required to create a todo.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NewTodo {
    /// Short label for the todo
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Completion flag, `false` when omitted
    #[serde(default)]
    pub status: bool,
}

impl NewTodo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: false,
        }
    }
}

/// Partial update of a todo. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct TodoChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
}

/// Error type for TodoRepo operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// No todo exists with the given ID.
    #[error("Todo with ID {0} not found")]
    NotFound(TodoId),
    /// The store could not be reached or rejected the query.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sea_orm::DbErr),
    /// The input could not be turned into a todo.
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// CRUD operations over the todo store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoRepo: Send + Sync {
    /// Returns every stored todo in insertion order.
    async fn get_todos(&self) -> Result<Vec<Todo>, TodoError>;

    /// Returns the todo with the given ID.
    async fn get_todo(&self, id: TodoId) -> Result<Todo, TodoError>;

    /// Persists a new todo and returns it with its assigned ID.
    async fn add_todo(&self, new_todo: NewTodo) -> Result<Todo, TodoError>;

    /// Applies `changes` to the todo with the given ID and returns the updated todo.
    async fn update_todo(&self, id: TodoId, changes: TodoChanges) -> Result<Todo, TodoError>;

    /// Removes the todo with the given ID and returns its last known state.
    async fn delete_todo(&self, id: TodoId) -> Result<Todo, TodoError>;
}

/// [`TodoRepo`] backed by a `sea-orm` connection.
#[derive(Clone, Debug)]
pub struct TodoRepoImpl {
    db: DatabaseConnection,
}

impl TodoRepoImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: TodoId) -> Result<todo::Model, TodoError> {
        todo::Entity::find_by_id(id.as_uuid())
            .one(&self.db)
            .await?
            .ok_or(TodoError::NotFound(id))
    }
}

#[async_trait]
impl TodoRepo for TodoRepoImpl {
    #[tracing::instrument(skip(self))]
    async fn get_todos(&self) -> Result<Vec<Todo>, TodoError> {
        let todos = todo::Entity::find()
            .order_by_asc(todo::Column::CreatedAt)
            .order_by_asc(todo::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Todo::from)
            .collect();
        Ok(todos)
    }

    #[tracing::instrument(skip(self))]
    async fn get_todo(&self, id: TodoId) -> Result<Todo, TodoError> {
        self.find_model(id).await.map(Todo::from)
    }

    #[tracing::instrument(skip(self))]
    async fn add_todo(&self, new_todo: NewTodo) -> Result<Todo, TodoError> {
        let active_model = todo::ActiveModel {
            name: ActiveValue::Set(new_todo.name),
            description: ActiveValue::Set(new_todo.description),
            status: ActiveValue::Set(new_todo.status),
            ..Default::default()
        };
        let created_model = active_model.insert(&self.db).await?;
        tracing::info!("Created todo {}", created_model.id);
        Ok(Todo::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn update_todo(&self, id: TodoId, changes: TodoChanges) -> Result<Todo, TodoError> {
        let todo_to_update = self.find_model(id).await?;

        let mut active_model: todo::ActiveModel = todo_to_update.into();
        if let Some(name) = changes.name {
            active_model.name = ActiveValue::Set(name);
        }
        if let Some(description) = changes.description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(status) = changes.status {
            active_model.status = ActiveValue::Set(status);
        }
        let updated_model = active_model.update(&self.db).await?;

        Ok(Todo::from(updated_model))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_todo(&self, id: TodoId) -> Result<Todo, TodoError> {
        let todo_to_delete = self.find_model(id).await?;

        let result = todo::Entity::delete_by_id(id.as_uuid())
            .exec(&self.db)
            .await?;
        // Another request removed it between the lookup and the delete.
        if result.rows_affected == 0 {
            return Err(TodoError::NotFound(id));
        }
        tracing::info!("Deleted todo {}", id);
        Ok(Todo::from(todo_to_delete))
    }
}
