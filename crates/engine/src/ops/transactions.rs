//! Transaction lifecycle: the write side of the ledger.
//!
//! Create, update and delete each run inside one database transaction; the
//! row write, the wallet balance deltas and the account recomputations either
//! all land or none do.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    BalanceEffect, CategoryKind, CreateTransactionCmd, EngineError, ResultEngine, Transaction,
    TransactionKind, UpdateTransactionCmd, balance_effects, invert, touched_accounts,
    transactions::{self, TransactionInput},
    wallets,
};

use super::{Engine, with_tx};

/// Filters for [`Engine::list_transactions`].
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub wallet_id: Option<Uuid>,
    pub kinds: Vec<TransactionKind>,
    pub include_deleted: bool,
    pub limit: Option<u64>,
}

impl TransactionListFilter {
    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kinds.push(kind);
        self
    }

    #[must_use]
    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Engine {
    /// Records a transaction and applies its balance effects.
    ///
    /// When an expense or transfer carries `admin_fee_minor`, an independent
    /// expense child (same source wallet, amount equal to the fee, filed
    /// under the auto-created "Admin Fee" category) is created and applied
    /// inside the same database transaction. The parent's own amount is
    /// unaffected.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let mut tx = Transaction::new(TransactionInput {
                user_id: cmd.user_id.clone(),
                kind: cmd.kind,
                amount_minor: cmd.amount_minor,
                account_id: cmd.account_id.clone(),
                wallet_id: cmd.wallet_id,
                to_account_id: cmd.to_account_id.clone(),
                to_wallet_id: cmd.to_wallet_id,
                category_id: cmd.category_id,
                note: cmd.note.clone(),
                occurred_at: cmd.occurred_at,
            })?;
            self.check_transaction_refs(&db_tx, &tx).await?;

            let fee_minor = match (tx.kind, cmd.admin_fee_minor) {
                (_, None) => None,
                (TransactionKind::Income, Some(_)) => {
                    return Err(EngineError::InvalidKind(
                        "admin fee is not valid on income".to_string(),
                    ));
                }
                (_, Some(fee)) if fee > 0 => Some(fee),
                (_, Some(_)) => {
                    return Err(EngineError::InvalidAmount(
                        "admin_fee_minor must be > 0".to_string(),
                    ));
                }
            };
            tx.admin_fee_minor = fee_minor;

            let transaction_id = tx.id;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            let mut effects = balance_effects(&tx)?;
            self.apply_effects(&db_tx, &effects).await?;

            if let Some(fee) = fee_minor {
                let fee_category = self.ensure_admin_fee_category(&db_tx, &tx.user_id).await?;
                let mut child = Transaction::new(TransactionInput {
                    user_id: tx.user_id.clone(),
                    kind: TransactionKind::Expense,
                    amount_minor: fee,
                    account_id: tx.account_id.clone(),
                    wallet_id: tx.wallet_id,
                    to_account_id: None,
                    to_wallet_id: None,
                    category_id: Some(fee_category),
                    note: None,
                    occurred_at: tx.occurred_at,
                })?;
                child.parent_id = Some(transaction_id);
                child.is_admin_fee = true;
                transactions::ActiveModel::from(&child).insert(&db_tx).await?;

                let child_effects = balance_effects(&child)?;
                self.apply_effects(&db_tx, &child_effects).await?;
                effects.extend(child_effects);
            }

            self.recalculate_accounts(&db_tx, &touched_accounts(&effects))
                .await?;
            Ok(transaction_id)
        })
    }

    /// Edits a transaction as a full revert-then-apply, never a diff.
    ///
    /// The old effects are reverted and the new ones applied exactly once,
    /// then every account touched by either version is recomputed.
    /// The admin-fee child of a transfer is NOT touched when its parent
    /// changes; edit or delete the child on its own.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let old = self
                .require_transaction(&db_tx, cmd.transaction_id, &cmd.user_id)
                .await?;

            let kind = cmd.kind.unwrap_or(old.kind);
            let (to_account_id, to_wallet_id) = match kind {
                TransactionKind::Transfer => (
                    cmd.to_account_id.clone().or_else(|| old.to_account_id.clone()),
                    cmd.to_wallet_id.or(old.to_wallet_id),
                ),
                TransactionKind::Income | TransactionKind::Expense => (None, None),
            };
            let mut new = Transaction::new(TransactionInput {
                user_id: old.user_id.clone(),
                kind,
                amount_minor: cmd.amount_minor.unwrap_or(old.amount_minor),
                account_id: cmd.account_id.clone().unwrap_or_else(|| old.account_id.clone()),
                wallet_id: cmd.wallet_id.unwrap_or(old.wallet_id),
                to_account_id,
                to_wallet_id,
                category_id: cmd.category_id.or(old.category_id),
                note: cmd.note.clone().or_else(|| old.note.clone()),
                occurred_at: cmd.occurred_at.unwrap_or(old.occurred_at),
            })?;
            new.id = old.id;
            new.parent_id = old.parent_id;
            new.is_admin_fee = old.is_admin_fee;
            new.admin_fee_minor = old.admin_fee_minor;
            self.check_transaction_refs(&db_tx, &new).await?;

            let old_effects = balance_effects(&old)?;
            let new_effects = balance_effects(&new)?;

            self.apply_effects(&db_tx, &invert(&old_effects)).await?;
            transactions::ActiveModel::from(&new).update(&db_tx).await?;
            self.apply_effects(&db_tx, &new_effects).await?;

            let mut touched = old_effects;
            touched.extend(new_effects);
            self.recalculate_accounts(&db_tx, &touched_accounts(&touched))
                .await?;
            Ok(())
        })
    }

    /// Soft-deletes a transaction and reverts its balance effects.
    ///
    /// Deleting an already-deleted transaction is an error. Deleting a
    /// transfer parent leaves its admin-fee child in place.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
        deleted_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let tx = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;

            let active = transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id.to_string()),
                deleted_at: ActiveValue::Set(Some(deleted_at)),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            let effects = balance_effects(&tx)?;
            self.apply_effects(&db_tx, &invert(&effects)).await?;
            self.recalculate_accounts(&db_tx, &touched_accounts(&effects))
                .await?;
            Ok(())
        })
    }

    /// Return an active transaction.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            self.require_transaction(&db_tx, transaction_id, user_id)
                .await
        })
    }

    /// Lists the user's transactions, newest first.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()));
            if !filter.include_deleted {
                query = query.filter(transactions::Column::DeletedAt.is_null());
            }
            if let Some(wallet_id) = filter.wallet_id {
                let wallet_id = wallet_id.to_string();
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::WalletId.eq(wallet_id.clone()))
                        .add(transactions::Column::ToWalletId.eq(wallet_id)),
                );
            }
            if !filter.kinds.is_empty() {
                let kinds: Vec<String> = filter
                    .kinds
                    .iter()
                    .map(|kind| kind.as_str().to_string())
                    .collect();
                query = query.filter(transactions::Column::Kind.is_in(kinds));
            }
            query = query.order_by_desc(transactions::Column::OccurredAt);
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            let models: Vec<transactions::Model> = query.all(&db_tx).await?;
            models.into_iter().map(Transaction::try_from).collect()
        })
    }

    async fn require_transaction(
        &self,
        db: &DatabaseTransaction,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::KeyNotFound("transaction not exists".to_string()));
        }
        Transaction::try_from(model)
    }

    /// Checks that every account/wallet/category a transaction points at is
    /// active and owned by the transaction's user, and that a transfer stays
    /// within one currency.
    async fn check_transaction_refs(
        &self,
        db: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        let source_account = self
            .require_account_by_id(db, &tx.account_id, &tx.user_id)
            .await?;
        self.require_wallet_in_account(db, &tx.account_id, tx.wallet_id)
            .await?;

        if let (Some(to_account_id), Some(to_wallet_id)) = (&tx.to_account_id, tx.to_wallet_id) {
            let to_account = self
                .require_account_by_id(db, to_account_id, &tx.user_id)
                .await?;
            self.require_wallet_in_account(db, to_account_id, to_wallet_id)
                .await?;
            if to_account.currency != source_account.currency {
                return Err(EngineError::CurrencyMismatch(format!(
                    "cannot transfer from {} to {}",
                    source_account.currency, to_account.currency
                )));
            }
        }

        if let Some(category_id) = tx.category_id {
            let expected_kind = match tx.kind {
                TransactionKind::Income => Some(CategoryKind::Income),
                TransactionKind::Expense => Some(CategoryKind::Expense),
                TransactionKind::Transfer => None,
            };
            self.require_category(db, &tx.user_id, category_id, expected_kind)
                .await?;
        }
        Ok(())
    }

    /// Persists `balance += delta` for each effect.
    ///
    /// Each wallet is loaded fresh inside the transaction; a missing or
    /// soft-deleted wallet aborts the whole operation, which rolls back any
    /// deltas already written.
    pub(super) async fn apply_effects(
        &self,
        db: &DatabaseTransaction,
        effects: &[BalanceEffect],
    ) -> ResultEngine<()> {
        for effect in effects {
            let model = wallets::Entity::find_by_id(effect.wallet_id.to_string())
                .filter(wallets::Column::DeletedAt.is_null())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))?;

            let active = wallets::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                balance: ActiveValue::Set(model.balance + effect.amount_minor),
                ..Default::default()
            };
            active.update(db).await?;
        }
        Ok(())
    }
}
