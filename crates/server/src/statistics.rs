//! Statistics API endpoints

use api_types::stats::{AccountStats, StatsGet};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, user};

pub async fn get_stats(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(payload): Query<StatsGet>,
) -> Result<Json<AccountStats>, ServerError> {
    let stats = state
        .engine
        .account_statistics(&payload.account_id, &user.username)
        .await?;

    Ok(Json(AccountStats {
        account_id: stats.account_id,
        balance_minor: stats.balance_minor,
        total_income_minor: stats.income_minor,
        total_expenses_minor: stats.expense_minor,
    }))
}
