//! Accounts API endpoints

use api_types::account::{AccountCreated, AccountNew, AccountView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};

fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Idr => api_types::Currency::Idr,
    }
}

fn map_currency_from_api(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Idr => engine::Currency::Idr,
    }
}

fn view(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        currency: map_currency(account.currency),
        balance_minor: account.balance_minor,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountCreated>), ServerError> {
    let id = state
        .engine
        .new_account(
            &payload.name,
            &user.username,
            payload.currency.map(map_currency_from_api),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AccountCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.engine.list_accounts(&user.username).await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(&account_id, &user.username).await?;
    Ok(Json(view(account)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_account(&account_id, &user.username, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn recalculate(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountView>, ServerError> {
    state
        .engine
        .recalculate_account_balance(&account_id, &user.username)
        .await?;
    let account = state.engine.account(&account_id, &user.username).await?;
    Ok(Json(view(account)))
}
