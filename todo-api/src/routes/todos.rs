/// Todo endpoints
///
/// All of them act on the caller's own todos only. A todo that exists but
/// belongs to someone else is reported as not found.

use crate::{
    error::{ApiError, ApiResult},
    session::DbSession,
};
use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde::Deserialize;
use todo_shared::{
    auth::jwt::Identity,
    models::{NewTodo, Todo},
};
use validator::Validate;

/// Body of create and update requests
#[derive(Debug, Deserialize, Validate)]
pub struct TodoRequest {
    #[validate(length(min = 3, max = 255, message = "Title must be 3-255 characters"))]
    pub title: String,

    #[validate(length(min = 3, max = 100, message = "Description must be 3-100 characters"))]
    pub description: String,

    #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
    pub priority: i32,

    #[serde(default)]
    pub complete: bool,
}

fn todo_not_found() -> ApiError {
    ApiError::NotFound("Todo not found".to_string())
}

/// `GET /todos/`
pub async fn list_todos(
    Extension(identity): Extension<Identity>,
    mut db: DbSession,
) -> ApiResult<Json<Vec<Todo>>> {
    let todos = db.todos_for_owner(identity.id).await?;
    db.commit().await?;
    Ok(Json(todos))
}

/// `GET /todos/todo/:id`
pub async fn get_todo(
    Extension(identity): Extension<Identity>,
    Path(todo_id): Path<i64>,
    mut db: DbSession,
) -> ApiResult<Json<Todo>> {
    let todo = db
        .todo_for_owner(todo_id, identity.id)
        .await?
        .ok_or_else(todo_not_found)?;
    db.commit().await?;
    Ok(Json(todo))
}

/// `POST /todos/todo`, returns 201 with the stored todo
pub async fn create_todo(
    Extension(identity): Extension<Identity>,
    mut db: DbSession,
    Json(req): Json<TodoRequest>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    req.validate()?;

    let todo = db
        .create_todo(NewTodo {
            title: req.title,
            description: req.description,
            priority: req.priority,
            complete: req.complete,
            owner_id: identity.id,
        })
        .await?;
    db.commit().await?;

    tracing::debug!(todo_id = todo.id, owner_id = identity.id, "Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `PUT /todos/todo/:id`
pub async fn update_todo(
    Extension(identity): Extension<Identity>,
    Path(todo_id): Path<i64>,
    mut db: DbSession,
    Json(req): Json<TodoRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let mut todo = db
        .todo_for_owner(todo_id, identity.id)
        .await?
        .ok_or_else(todo_not_found)?;

    todo.title = req.title;
    todo.description = req.description;
    todo.priority = req.priority;
    todo.complete = req.complete;

    if !db.save_todo(&todo).await? {
        return Err(todo_not_found());
    }
    db.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /todos/todo/:id/complete` flips the completion flag
pub async fn toggle_complete(
    Extension(identity): Extension<Identity>,
    Path(todo_id): Path<i64>,
    mut db: DbSession,
) -> ApiResult<StatusCode> {
    let mut todo = db
        .todo_for_owner(todo_id, identity.id)
        .await?
        .ok_or_else(todo_not_found)?;

    todo.toggle_complete();

    if !db.save_todo(&todo).await? {
        return Err(todo_not_found());
    }
    db.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /todos/todo/:id`
pub async fn delete_todo(
    Extension(identity): Extension<Identity>,
    Path(todo_id): Path<i64>,
    mut db: DbSession,
) -> ApiResult<StatusCode> {
    if !db.delete_todo(todo_id, identity.id).await? {
        return Err(todo_not_found());
    }
    db.commit().await?;

    tracing::debug!(todo_id, owner_id = identity.id, "Todo deleted");
    Ok(StatusCode::NO_CONTENT)
}
