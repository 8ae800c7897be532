//! Transactions API endpoints

use api_types::transaction::{
    TransactionCreated, TransactionKind as ApiKind, TransactionList, TransactionListResponse,
    TransactionNew, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
    }
}

fn map_kind_from_api(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        account_id: tx.account_id,
        wallet_id: tx.wallet_id,
        to_account_id: tx.to_account_id,
        to_wallet_id: tx.to_wallet_id,
        category_id: tx.category_id,
        note: tx.note,
        occurred_at: tx.occurred_at.fixed_offset(),
        deleted: tx.deleted_at.is_some(),
        parent_id: tx.parent_id,
        is_admin_fee: tx.is_admin_fee,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let mut cmd = engine::CreateTransactionCmd::new(
        user.username,
        map_kind_from_api(payload.kind),
        payload.amount_minor,
        payload.account_id,
        payload.wallet_id,
        payload.occurred_at.with_timezone(&Utc),
    );
    if let (Some(to_account_id), Some(to_wallet_id)) =
        (payload.to_account_id, payload.to_wallet_id)
    {
        cmd = cmd.destination(to_account_id, to_wallet_id);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(fee) = payload.admin_fee_minor {
        cmd = cmd.admin_fee_minor(fee);
    }

    let id = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(payload): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let mut filter = engine::TransactionListFilter::default();
    if let Some(wallet_id) = payload.wallet_id {
        filter = filter.wallet_id(wallet_id);
    }
    if let Some(kind) = payload.kind {
        filter = filter.kind(map_kind_from_api(kind));
    }
    if payload.include_deleted.unwrap_or(false) {
        filter = filter.include_deleted();
    }
    filter = filter.limit(payload.limit.unwrap_or(50));

    let txs = state
        .engine
        .list_transactions(&user.username, filter)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .transaction(transaction_id, &user.username)
        .await?;
    Ok(Json(view(tx)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let cmd = engine::UpdateTransactionCmd {
        transaction_id,
        user_id: user.username.clone(),
        kind: payload.kind.map(map_kind_from_api),
        amount_minor: payload.amount_minor,
        account_id: payload.account_id,
        wallet_id: payload.wallet_id,
        to_account_id: payload.to_account_id,
        to_wallet_id: payload.to_wallet_id,
        category_id: payload.category_id,
        note: payload.note,
        occurred_at: payload.occurred_at.map(|dt| dt.with_timezone(&Utc)),
    };
    state.engine.update_transaction(cmd).await?;

    let tx = state
        .engine
        .transaction(transaction_id, &user.username)
        .await?;
    Ok(Json(view(tx)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(transaction_id, &user.username, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
