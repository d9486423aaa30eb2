/// Web todo pages
///
/// Every handler acts on the signed-in user's todos only and answers with a
/// redirect back to `/todos` after a change.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use todo_shared::models::NewTodo;
use validator::Validate;

use super::{found, WebUser};
use crate::{app::AppState, error::ApiResult, session::DbSession};

const INVALID_TODO: &str =
    "Title needs 3-255 characters, description 3-100 characters, priority 1-5";

/// Add and edit form
#[derive(Debug, Deserialize, Validate)]
pub struct TodoForm {
    #[validate(length(min = 3, max = 255))]
    pub title: String,

    #[validate(length(min = 3, max = 100))]
    pub description: String,

    #[validate(range(min = 1, max = 5))]
    pub priority: i32,
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Todo not found").into_response()
}

/// `GET /todos`
pub async fn home(
    State(state): State<AppState>,
    WebUser(user): WebUser,
    mut db: DbSession,
) -> ApiResult<Html<String>> {
    let todos = db.todos_for_owner(user.id).await?;
    db.commit().await?;

    Ok(Html(state.pages.home(&user, &todos)?))
}

/// `GET /todos/add-todo`
pub async fn add_todo_page(
    State(state): State<AppState>,
    WebUser(user): WebUser,
) -> ApiResult<Html<String>> {
    Ok(Html(state.pages.add_todo(&user, None)?))
}

/// `POST /todos/add-todo`
pub async fn add_todo(
    State(state): State<AppState>,
    WebUser(user): WebUser,
    mut db: DbSession,
    Form(form): Form<TodoForm>,
) -> ApiResult<Response> {
    if form.validate().is_err() {
        let page = Html(state.pages.add_todo(&user, Some(INVALID_TODO))?);
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    db.create_todo(NewTodo {
        title: form.title,
        description: form.description,
        priority: form.priority,
        complete: false,
        owner_id: user.id,
    })
    .await?;
    db.commit().await?;

    Ok(found("/todos"))
}

/// `GET /todos/edit-todo/:id`
pub async fn edit_todo_page(
    State(state): State<AppState>,
    WebUser(user): WebUser,
    Path(todo_id): Path<i64>,
    mut db: DbSession,
) -> ApiResult<Response> {
    let Some(todo) = db.todo_for_owner(todo_id, user.id).await? else {
        return Ok(not_found());
    };
    db.commit().await?;

    Ok(Html(state.pages.edit_todo(&user, &todo, None)?).into_response())
}

/// `POST /todos/edit-todo/:id`
///
/// Changes title, description and priority; completion is left alone.
pub async fn edit_todo(
    State(state): State<AppState>,
    WebUser(user): WebUser,
    Path(todo_id): Path<i64>,
    mut db: DbSession,
    Form(form): Form<TodoForm>,
) -> ApiResult<Response> {
    let Some(mut todo) = db.todo_for_owner(todo_id, user.id).await? else {
        return Ok(not_found());
    };

    if form.validate().is_err() {
        let page = Html(state.pages.edit_todo(&user, &todo, Some(INVALID_TODO))?);
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    todo.title = form.title;
    todo.description = form.description;
    todo.priority = form.priority;

    if !db.save_todo(&todo).await? {
        return Ok(not_found());
    }
    db.commit().await?;

    Ok(found("/todos"))
}

/// `GET /todos/delete/:id`
///
/// A missing todo answers 404 but still names `/todos` as its location.
pub async fn delete_todo(
    WebUser(user): WebUser,
    Path(todo_id): Path<i64>,
    mut db: DbSession,
) -> ApiResult<Response> {
    if !db.delete_todo(todo_id, user.id).await? {
        return Ok((StatusCode::NOT_FOUND, [(header::LOCATION, "/todos")]).into_response());
    }
    db.commit().await?;

    Ok(found("/todos"))
}

/// `GET /todos/complete/:id` flips the completion flag
pub async fn complete_todo(
    WebUser(user): WebUser,
    Path(todo_id): Path<i64>,
    mut db: DbSession,
) -> ApiResult<Response> {
    let Some(mut todo) = db.todo_for_owner(todo_id, user.id).await? else {
        return Ok(not_found());
    };

    todo.toggle_complete();

    if !db.save_todo(&todo).await? {
        return Ok(not_found());
    }
    db.commit().await?;

    Ok(found("/todos"))
}
