//! Read-side summation reports.

use sea_orm::{DatabaseTransaction, Statement, TransactionTrait, prelude::*};

use crate::ResultEngine;

use super::{Engine, with_tx};

/// Per-account totals: the current balance plus lifetime income and expense
/// sums over active transactions. Transfers move money around without being
/// income or expense, so they are excluded from both sums.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountStats {
    pub account_id: String,
    pub balance_minor: i64,
    pub income_minor: i64,
    pub expense_minor: i64,
}

impl Engine {
    /// Computes [`AccountStats`] for one account.
    pub async fn account_statistics(
        &self,
        account_id: &str,
        user_id: &str,
    ) -> ResultEngine<AccountStats> {
        with_tx!(self, |db_tx| {
            let account = self.require_account_by_id(&db_tx, account_id, user_id).await?;

            let income_minor = self.sum_by_kind(&db_tx, account_id, "income").await?;
            let expense_minor = self.sum_by_kind(&db_tx, account_id, "expense").await?;

            Ok(AccountStats {
                account_id: account_id.to_string(),
                balance_minor: account.balance,
                income_minor,
                expense_minor,
            })
        })
    }

    async fn sum_by_kind(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
        kind: &str,
    ) -> ResultEngine<i64> {
        let backend = db.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
             FROM transactions \
             WHERE account_id = ? AND kind = ? AND deleted_at IS NULL",
            vec![account_id.into(), kind.into()],
        );
        let row = db.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }
}
