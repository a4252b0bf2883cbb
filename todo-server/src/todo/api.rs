use crate::todo::{NewTodo, Todo, TodoChanges, TodoError, TodoId, TodoRepo, TodoRepoImpl};
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Router state holding the repository shared by all todo handlers.
#[derive(Clone)]
pub struct TodoState {
    pub repo: Arc<dyn TodoRepo>,
}

impl TodoState {
    pub fn new(repo: impl TodoRepo + 'static) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// Builds the state around a [`TodoRepoImpl`] over `db`.
    pub fn from_db(db: DatabaseConnection) -> Self {
        Self::new(TodoRepoImpl::new(db))
    }
}

/// JSON representation of a Todo for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoJson {
    /// Unique identifier assigned on creation
    pub id: Uuid,
    /// Short label for the todo
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Completion flag
    pub status: bool,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
    /// When the todo was last changed
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoJson {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id().as_uuid(),
            name: todo.name().to_string(),
            description: todo.description().to_string(),
            status: todo.status(),
            created_at: todo.created_at(),
            updated_at: todo.updated_at(),
        }
    }
}

/// API response carrying every stored todo.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodosResponse {
    pub todos: Vec<TodoJson>,
}

/// API response carrying a single todo.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoResponse {
    pub todo: TodoJson,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            todo: TodoJson::from(todo),
        }
    }
}

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(error: &str, message: String) -> Self {
        Self {
            error: error.to_string(),
            message,
        }
    }
}

impl From<JsonRejection> for TodoError {
    fn from(rejection: JsonRejection) -> Self {
        TodoError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for TodoError {
    fn from(rejection: PathRejection) -> Self {
        TodoError::Validation(rejection.body_text())
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let (status_code, error_response) = match self {
            TodoError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", format!("Todo with ID {} not found", id)),
            ),
            TodoError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", message),
            ),
            TodoError::StoreUnavailable(err) => {
                tracing::error!("Todo store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "STORE_UNAVAILABLE",
                        "The todo store is unavailable. Please try again later.".to_string(),
                    ),
                )
            }
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Handler for GET /api/todos - Returns all todos.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/todos",
    responses(
        (status = 200, description = "Successfully retrieved todos", body = TodosResponse),
        (status = 500, description = "Todo store unavailable", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn get_todos_handler(
    State(state): State<TodoState>,
) -> Result<Json<TodosResponse>, TodoError> {
    let todos = state.repo.get_todos().await?;
    Ok(Json(TodosResponse {
        todos: todos.into_iter().map(TodoJson::from).collect(),
    }))
}

/// Handler for POST /api/todos - Creates a todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = NewTodo,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Missing or mistyped field", body = ErrorResponse),
        (status = 500, description = "Todo store unavailable", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn create_todo_handler(
    State(state): State<TodoState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), TodoError> {
    let Json(new_todo) = payload?;
    let todo = state.repo.add_todo(new_todo).await?;
    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

/// Handler for GET /api/todos/{id} - Returns a single todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "ID of the todo")
    ),
    responses(
        (status = 200, description = "Todo found", body = TodoResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn get_todo_handler(
    State(state): State<TodoState>,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<TodoResponse>, TodoError> {
    let Path(id) = id?;
    let todo = state.repo.get_todo(id).await?;
    Ok(Json(TodoResponse::from(todo)))
}

/// Handler for PUT /api/todos/{id} - Applies a partial update.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "ID of the todo")
    ),
    request_body = TodoChanges,
    responses(
        (status = 200, description = "Todo updated", body = TodoResponse),
        (status = 400, description = "Malformed ID or body", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn update_todo_handler(
    State(state): State<TodoState>,
    id: Result<Path<TodoId>, PathRejection>,
    payload: Result<Json<TodoChanges>, JsonRejection>,
) -> Result<Json<TodoResponse>, TodoError> {
    let Path(id) = id?;
    let Json(changes) = payload?;
    let todo = state.repo.update_todo(id, changes).await?;
    Ok(Json(TodoResponse::from(todo)))
}

/// Handler for DELETE /api/todos/{id} - Removes a todo and returns it.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "ID of the todo")
    ),
    responses(
        (status = 200, description = "Todo deleted", body = TodoResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todo_handler(
    State(state): State<TodoState>,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<TodoResponse>, TodoError> {
    let Path(id) = id?;
    let todo = state.repo.delete_todo(id).await?;
    Ok(Json(TodoResponse::from(todo)))
}

/// Creates and returns the todos router.
pub fn create_todo_router(state: TodoState) -> Router {
    Router::new()
        .route("/todos", get(get_todos_handler).post(create_todo_handler))
        .route(
            "/todos/{id}",
            get(get_todo_handler)
                .put(update_todo_handler)
                .delete(delete_todo_handler),
        )
        .with_state(state)
}
