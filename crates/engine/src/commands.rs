//! Command structs for engine operations.
//!
//! These types group parameters for the transaction write operations, keeping
//! call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::TransactionKind;

/// Create a transaction (income, expense, or transfer).
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub account_id: String,
    pub wallet_id: Uuid,
    pub to_account_id: Option<String>,
    pub to_wallet_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    /// When set, an independent admin-fee expense child is created alongside
    /// the transaction for this amount.
    pub admin_fee_minor: Option<i64>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount_minor: i64,
        account_id: impl Into<String>,
        wallet_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            amount_minor,
            account_id: account_id.into(),
            wallet_id,
            to_account_id: None,
            to_wallet_id: None,
            category_id: None,
            note: None,
            occurred_at,
            admin_fee_minor: None,
        }
    }

    #[must_use]
    pub fn destination(mut self, account_id: impl Into<String>, wallet_id: Uuid) -> Self {
        self.to_account_id = Some(account_id.into());
        self.to_wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn admin_fee_minor(mut self, fee_minor: i64) -> Self {
        self.admin_fee_minor = Some(fee_minor);
        self
    }
}

/// Update an existing transaction.
///
/// Every field is an optional patch; unset fields keep the stored value. A
/// kind change to or from `Transfer` must come with the matching destination
/// fields (or none).
#[derive(Clone, Debug, Default)]
pub struct UpdateTransactionCmd {
    pub transaction_id: Uuid,
    pub user_id: String,

    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub account_id: Option<String>,
    pub wallet_id: Option<Uuid>,
    pub to_account_id: Option<String>,
    pub to_wallet_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            transaction_id,
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn source(mut self, account_id: impl Into<String>, wallet_id: Uuid) -> Self {
        self.account_id = Some(account_id.into());
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn destination(mut self, account_id: impl Into<String>, wallet_id: Uuid) -> Self {
        self.to_account_id = Some(account_id.into());
        self.to_wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}
