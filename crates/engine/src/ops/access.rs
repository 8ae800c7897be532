use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{CategoryKind, EngineError, ResultEngine, accounts, categories, wallets};

use super::Engine;

impl Engine {
    /// Loads an active account owned by `user_id`.
    ///
    /// Ownership misses and soft-deleted rows are both reported as not found,
    /// so callers cannot probe for other users' account ids.
    pub(super) async fn require_account_by_id(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
        user_id: &str,
    ) -> ResultEngine<accounts::Model> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .filter(accounts::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::KeyNotFound("account not exists".to_string()));
        }
        Ok(model)
    }

    /// Loads an active wallet that belongs to the given account.
    pub(super) async fn require_wallet_in_account(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
        wallet_id: Uuid,
    ) -> ResultEngine<wallets::Model> {
        wallets::Entity::find_by_id(wallet_id.to_string())
            .filter(wallets::Column::AccountId.eq(account_id.to_string()))
            .filter(wallets::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }

    /// Loads an active category owned by `user_id`, optionally checking that
    /// its kind matches the transaction kind (skipped for transfers).
    pub(super) async fn require_category(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
        expected_kind: Option<CategoryKind>,
    ) -> ResultEngine<categories::Model> {
        let model = categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }
        if let Some(expected) = expected_kind {
            if model.kind != expected.as_str() {
                return Err(EngineError::InvalidKind(
                    "category kind does not match transaction kind".to_string(),
                ));
            }
        }
        Ok(model)
    }
}
