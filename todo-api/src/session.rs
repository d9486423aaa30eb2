/// Request-scoped database session
///
/// `DbSession` is an extractor: it opens a store session when the handler is
/// invoked and owns it until the handler returns. Handlers call
/// [`DbSession::commit`] on their success path; on any other exit the session
/// is dropped and its writes are rolled back.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Json};
/// use todo_api::{error::ApiResult, session::DbSession};
/// use todo_shared::{auth::jwt::Identity, models::Todo};
///
/// async fn list(
///     Extension(identity): Extension<Identity>,
///     mut db: DbSession,
/// ) -> ApiResult<Json<Vec<Todo>>> {
///     let todos = db.todos_for_owner(identity.id).await?;
///     db.commit().await?;
///     Ok(Json(todos))
/// }
/// ```

use std::ops::{Deref, DerefMut};

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use todo_shared::db::store::Session;

use crate::{app::AppState, error::ApiError};

/// Store session bound to one request
pub struct DbSession(Box<dyn Session>);

impl DbSession {
    /// Commits and releases the session
    pub async fn commit(mut self) -> Result<(), ApiError> {
        self.0.commit().await?;
        Ok(())
    }
}

impl Deref for DbSession {
    type Target = dyn Session;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for DbSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.store.begin().await?;
        Ok(Self(session))
    }
}
