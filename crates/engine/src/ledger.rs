//! Balance mutation primitives.
//!
//! A transaction's effect on the world is a small set of signed wallet deltas
//! ([`BalanceEffect`]). Computing them is pure; persisting them and recomputing
//! the touched accounts is the job of the lifecycle operations in `ops`.
//!
//! Reverting a transaction is the exact negation of its effects, which is what
//! makes `revert(apply(t))` restore balances bit-for-bit and lets an update be
//! implemented as revert-then-apply instead of a per-field diff.

use uuid::Uuid;

use crate::{ResultEngine, Transaction, TransactionKind};

/// A signed delta against one wallet's balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceEffect {
    pub wallet_id: Uuid,
    pub account_id: String,
    pub amount_minor: i64,
}

/// Computes the wallet deltas of a transaction.
///
/// - income: `+amount` on the source wallet
/// - expense: `-amount` on the source wallet
/// - transfer: `-amount` on the source wallet, `+amount` on the destination
///   wallet (which may live under a different account)
///
/// Assumes an already-validated transaction; a transfer without a destination
/// is rejected here as a last line of defense.
pub fn balance_effects(tx: &Transaction) -> ResultEngine<Vec<BalanceEffect>> {
    let effects = match tx.kind {
        TransactionKind::Income => vec![BalanceEffect {
            wallet_id: tx.wallet_id,
            account_id: tx.account_id.clone(),
            amount_minor: tx.amount_minor,
        }],
        TransactionKind::Expense => vec![BalanceEffect {
            wallet_id: tx.wallet_id,
            account_id: tx.account_id.clone(),
            amount_minor: -tx.amount_minor,
        }],
        TransactionKind::Transfer => {
            let to_wallet_id = tx.to_wallet_id.ok_or_else(|| {
                crate::EngineError::InvalidKind(
                    "transfer requires a destination wallet".to_string(),
                )
            })?;
            let to_account_id = tx.to_account_id.clone().ok_or_else(|| {
                crate::EngineError::InvalidKind(
                    "transfer requires a destination account".to_string(),
                )
            })?;
            vec![
                BalanceEffect {
                    wallet_id: tx.wallet_id,
                    account_id: tx.account_id.clone(),
                    amount_minor: -tx.amount_minor,
                },
                BalanceEffect {
                    wallet_id: to_wallet_id,
                    account_id: to_account_id,
                    amount_minor: tx.amount_minor,
                },
            ]
        }
    };
    Ok(effects)
}

/// The exact inverse of a set of effects.
#[must_use]
pub fn invert(effects: &[BalanceEffect]) -> Vec<BalanceEffect> {
    effects
        .iter()
        .map(|effect| BalanceEffect {
            wallet_id: effect.wallet_id,
            account_id: effect.account_id.clone(),
            amount_minor: -effect.amount_minor,
        })
        .collect()
}

/// Distinct accounts touched by a set of effects, in first-seen order.
///
/// Each of these must be recomputed from its wallets after the wallet deltas
/// are persisted.
#[must_use]
pub fn touched_accounts(effects: &[BalanceEffect]) -> Vec<String> {
    let mut accounts: Vec<String> = Vec::with_capacity(effects.len());
    for effect in effects {
        if !accounts.contains(&effect.account_id) {
            accounts.push(effect.account_id.clone());
        }
    }
    accounts
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::transactions::TransactionInput;

    fn transaction(
        kind: TransactionKind,
        amount_minor: i64,
        to: Option<(&str, Uuid)>,
    ) -> Transaction {
        Transaction::new(TransactionInput {
            user_id: "alice".to_string(),
            kind,
            amount_minor,
            account_id: "acc-a".to_string(),
            wallet_id: Uuid::new_v4(),
            to_account_id: to.map(|(account_id, _)| account_id.to_string()),
            to_wallet_id: to.map(|(_, wallet_id)| wallet_id),
            category_id: None,
            note: None,
            occurred_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn income_is_a_single_positive_delta() {
        let tx = transaction(TransactionKind::Income, 1000, None);
        let effects = balance_effects(&tx).unwrap();

        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].wallet_id, tx.wallet_id);
        assert_eq!(effects[0].account_id, "acc-a");
        assert_eq!(effects[0].amount_minor, 1000);
    }

    #[test]
    fn expense_is_a_single_negative_delta() {
        let tx = transaction(TransactionKind::Expense, 300, None);
        let effects = balance_effects(&tx).unwrap();

        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].amount_minor, -300);
    }

    #[test]
    fn transfer_moves_amount_between_wallets() {
        let to_wallet = Uuid::new_v4();
        let tx = transaction(TransactionKind::Transfer, 200, Some(("acc-b", to_wallet)));
        let effects = balance_effects(&tx).unwrap();

        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].wallet_id, tx.wallet_id);
        assert_eq!(effects[0].amount_minor, -200);
        assert_eq!(effects[1].wallet_id, to_wallet);
        assert_eq!(effects[1].account_id, "acc-b");
        assert_eq!(effects[1].amount_minor, 200);
        assert_eq!(effects.iter().map(|e| e.amount_minor).sum::<i64>(), 0);
    }

    #[test]
    fn invert_negates_every_delta() {
        let to_wallet = Uuid::new_v4();
        let tx = transaction(TransactionKind::Transfer, 200, Some(("acc-b", to_wallet)));
        let effects = balance_effects(&tx).unwrap();
        let inverted = invert(&effects);

        for (effect, inverse) in effects.iter().zip(&inverted) {
            assert_eq!(effect.wallet_id, inverse.wallet_id);
            assert_eq!(effect.account_id, inverse.account_id);
            assert_eq!(effect.amount_minor, -inverse.amount_minor);
        }
    }

    #[test]
    fn touched_accounts_deduplicates_same_account_transfer() {
        let to_wallet = Uuid::new_v4();
        let tx = transaction(TransactionKind::Transfer, 100, Some(("acc-a", to_wallet)));
        let effects = balance_effects(&tx).unwrap();

        assert_eq!(touched_accounts(&effects), vec!["acc-a".to_string()]);
    }

    #[test]
    fn touched_accounts_keeps_cross_account_pair() {
        let to_wallet = Uuid::new_v4();
        let tx = transaction(TransactionKind::Transfer, 100, Some(("acc-b", to_wallet)));
        let effects = balance_effects(&tx).unwrap();

        assert_eq!(
            touched_accounts(&effects),
            vec!["acc-a".to_string(), "acc-b".to_string()]
        );
    }
}
