//! Categories API endpoints

use api_types::category::{CategoryCreated, CategoryKind as ApiKind, CategoryNew, CategoryView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: engine::CategoryKind) -> ApiKind {
    match kind {
        engine::CategoryKind::Income => ApiKind::Income,
        engine::CategoryKind::Expense => ApiKind::Expense,
    }
}

fn map_kind_from_api(kind: ApiKind) -> engine::CategoryKind {
    match kind {
        ApiKind::Income => engine::CategoryKind::Income,
        ApiKind::Expense => engine::CategoryKind::Expense,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryCreated>), ServerError> {
    let id = state
        .engine
        .new_category(&payload.name, map_kind_from_api(payload.kind), &user.username)
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.list_categories(&user.username).await?;
    Ok(Json(
        categories
            .into_iter()
            .map(|c| CategoryView {
                id: c.id,
                name: c.name,
                kind: map_kind(c.kind),
            })
            .collect(),
    ))
}
