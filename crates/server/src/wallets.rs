//! Wallets API endpoints

use api_types::wallet::{WalletCreated, WalletNew, WalletView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(wallet: engine::Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        name: wallet.name,
        account_id: wallet.account_id,
        balance_minor: wallet.balance_minor,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletNew>,
) -> Result<(StatusCode, Json<WalletCreated>), ServerError> {
    let id = state
        .engine
        .new_wallet(
            &payload.account_id,
            &payload.name,
            payload.balance_minor.unwrap_or(0),
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(WalletCreated { id })))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(wallet_id, &user.username).await?;
    Ok(Json(view(wallet)))
}

pub async fn list_for_account(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let wallets = state
        .engine
        .list_wallets(&account_id, &user.username)
        .await?;
    Ok(Json(wallets.into_iter().map(view).collect()))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_wallet(wallet_id, &user.username, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
