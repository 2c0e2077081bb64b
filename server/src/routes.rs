use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use serde::Deserialize;

use crate::error::StoreError;
use crate::state::AppState;
use crate::store::{parse_id, Todo, TodoId};

#[derive(Debug, Deserialize)]
pub struct CreateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Full replacement of the mutable fields; omitted ones are cleared.
#[derive(Debug, Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// A path id that doesn't parse matches no todo.
fn lookup_id(raw: &str) -> Result<TodoId, StoreError> {
    parse_id(raw).ok_or(StoreError::NotFound)
}

#[tracing::instrument(skip(state))]
pub async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    let store = state.store.read().await;
    Json(store.list().to_vec())
}

#[tracing::instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, StoreError> {
    let id = lookup_id(&id)?;
    let store = state.store.read().await;
    store.get(id).cloned().map(Json)
}

#[tracing::instrument(skip(state))]
pub async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StoreError> {
    let todo = state
        .store
        .write()
        .await
        .create(input.title, input.description)
        .inspect_err(|err| tracing::error!(error = %err, "cannot create todo"))?;
    tracing::info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

#[tracing::instrument(skip(state))]
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StoreError> {
    let id = lookup_id(&id)?;
    let todo = state
        .store
        .write()
        .await
        .update(id, input.title, input.description, input.completed)?;
    Ok(Json(todo))
}

#[tracing::instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StoreError> {
    let id = lookup_id(&id)?;
    state.store.write().await.delete(id)?;
    tracing::info!(id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

/// Anything outside `/todos`. Kept as an explicit route so the save layer
/// also sees these requests.
#[tracing::instrument(skip_all)]
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Runs after every request, whatever its outcome, and queues the
/// store for saving.
pub async fn persist_after_response(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    state.publish_snapshot().await;
    response
}
