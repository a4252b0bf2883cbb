use crate::todo::api::{TodoState, create_todo_router};

use axum::Router;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(todo_state: TodoState) -> Router {
    let todos_router = create_todo_router(todo_state);
    Router::new().nest("/api", todos_router)
}
