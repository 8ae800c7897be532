use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, Statement, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{Account, Currency, EngineError, ResultEngine, accounts, wallets};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new account for a user. Starts with a zero balance.
    pub async fn new_account(
        &self,
        name: &str,
        user_id: &str,
        currency: Option<Currency>,
    ) -> ResultEngine<String> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .filter(accounts::Column::DeletedAt.is_null())
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let account = Account::new(name, user_id, currency.unwrap_or_default());
            let account_id = account.id.clone();
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account_id)
        })
    }

    /// Return an account snapshot.
    pub async fn account(&self, account_id: &str, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account_by_id(&db_tx, account_id, user_id).await?;
            Account::try_from(model)
        })
    }

    /// Lists the user's active accounts.
    pub async fn list_accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models: Vec<accounts::Model> = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .filter(accounts::Column::DeletedAt.is_null())
                .all(&db_tx)
                .await?;
            models.into_iter().map(Account::try_from).collect()
        })
    }

    /// Soft-deletes an account.
    ///
    /// Only allowed once the account has no active wallets left; the derived
    /// account balance of a deleted account would otherwise go stale while
    /// its wallets still carry money.
    pub async fn delete_account(
        &self,
        account_id: &str,
        user_id: &str,
        deleted_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account_by_id(&db_tx, account_id, user_id).await?;

            let active_wallets = wallets::Entity::find()
                .filter(wallets::Column::AccountId.eq(account_id.to_string()))
                .filter(wallets::Column::DeletedAt.is_null())
                .count(&db_tx)
                .await?;
            if active_wallets > 0 {
                return Err(EngineError::InvalidAmount(
                    "account still has active wallets".to_string(),
                ));
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                deleted_at: ActiveValue::Set(Some(deleted_at)),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Authoritative reconciliation of an account's derived balance.
    ///
    /// Sums the balances of the account's active wallets fresh from storage
    /// and persists that sum. Exposed for the wallet-creation path, which
    /// inserts opening balances outside the transaction lifecycle.
    pub async fn recalculate_account_balance(
        &self,
        account_id: &str,
        user_id: &str,
    ) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            self.require_account_by_id(&db_tx, account_id, user_id).await?;
            self.recalculate_account_balance_tx(&db_tx, account_id).await
        })
    }

    /// Recomputes `account.balance` from active wallets, inside the caller's
    /// DB transaction. Never incremental: summing fresh from storage after
    /// every wallet mutation is what keeps drift out of the account column.
    pub(super) async fn recalculate_account_balance_tx(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
    ) -> ResultEngine<i64> {
        let backend = db.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(balance), 0) AS sum \
             FROM wallets \
             WHERE account_id = ? AND deleted_at IS NULL",
            vec![account_id.into()],
        );
        let row = db.query_one(stmt).await?;
        let sum: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);

        let active = accounts::ActiveModel {
            id: ActiveValue::Set(account_id.to_string()),
            balance: ActiveValue::Set(sum),
            ..Default::default()
        };
        active.update(db).await?;
        Ok(sum)
    }

    /// Recomputes every account in `account_ids` (already distinct).
    pub(super) async fn recalculate_accounts(
        &self,
        db: &DatabaseTransaction,
        account_ids: &[String],
    ) -> ResultEngine<()> {
        for account_id in account_ids {
            self.recalculate_account_balance_tx(db, account_id).await?;
        }
        Ok(())
    }
}
