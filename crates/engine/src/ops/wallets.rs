use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Wallet, wallets};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new wallet inside an account.
    ///
    /// `balance_minor` is the opening balance. Wallet creation bypasses the
    /// transaction lifecycle, so the account is reconciled explicitly right
    /// after the insert.
    pub async fn new_wallet(
        &self,
        account_id: &str,
        name: &str,
        balance_minor: i64,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "wallet")?;
        with_tx!(self, |db_tx| {
            self.require_account_by_id(&db_tx, account_id, user_id).await?;

            let exists = wallets::Entity::find()
                .filter(wallets::Column::AccountId.eq(account_id.to_string()))
                .filter(wallets::Column::DeletedAt.is_null())
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let wallet = Wallet::new(name, account_id, user_id, balance_minor);
            let wallet_id = wallet.id;
            wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;

            self.recalculate_account_balance_tx(&db_tx, account_id).await?;
            Ok(wallet_id)
        })
    }

    /// Return a wallet snapshot.
    pub async fn wallet(&self, wallet_id: Uuid, user_id: &str) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = wallets::Entity::find_by_id(wallet_id.to_string())
                .filter(wallets::Column::DeletedAt.is_null())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))?;
            if model.user_id != user_id {
                return Err(EngineError::KeyNotFound("wallet not exists".to_string()));
            }
            Wallet::try_from(model)
        })
    }

    /// Lists the active wallets of an account.
    pub async fn list_wallets(&self, account_id: &str, user_id: &str) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| {
            self.require_account_by_id(&db_tx, account_id, user_id).await?;
            let models: Vec<wallets::Model> = wallets::Entity::find()
                .filter(wallets::Column::AccountId.eq(account_id.to_string()))
                .filter(wallets::Column::DeletedAt.is_null())
                .all(&db_tx)
                .await?;
            models.into_iter().map(Wallet::try_from).collect()
        })
    }

    /// Soft-deletes a wallet and reconciles its account.
    ///
    /// The wallet's transactions stay in place; the wallet simply stops
    /// counting toward the account balance.
    pub async fn delete_wallet(
        &self,
        wallet_id: Uuid,
        user_id: &str,
        deleted_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = wallets::Entity::find_by_id(wallet_id.to_string())
                .filter(wallets::Column::DeletedAt.is_null())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))?;
            if model.user_id != user_id {
                return Err(EngineError::KeyNotFound("wallet not exists".to_string()));
            }
            let account_id = model.account_id.clone();

            let active = wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id.to_string()),
                deleted_at: ActiveValue::Set(Some(deleted_at)),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            self.recalculate_account_balance_tx(&db_tx, &account_id).await?;
            Ok(())
        })
    }
}
