//! Transaction primitives.
//!
//! A `Transaction` is an atomic money movement: income into a wallet, expense
//! out of a wallet, or a wallet-to-wallet transfer (possibly cross-account).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidKind(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
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
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set on auto-generated admin-fee children; points at the transaction
    /// the fee was charged for.
    pub parent_id: Option<Uuid>,
    pub is_admin_fee: bool,
    /// Informational copy of the fee carried by this transaction. The fee
    /// itself is a separate child transaction.
    pub admin_fee_minor: Option<i64>,
}

pub struct TransactionInput {
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
}

impl Transaction {
    pub fn new(input: TransactionInput) -> ResultEngine<Self> {
        if input.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        match input.kind {
            TransactionKind::Transfer => {
                let to_wallet_id = input.to_wallet_id.ok_or_else(|| {
                    EngineError::InvalidKind("transfer requires a destination wallet".to_string())
                })?;
                if input.to_account_id.is_none() {
                    return Err(EngineError::InvalidKind(
                        "transfer requires a destination account".to_string(),
                    ));
                }
                if to_wallet_id == input.wallet_id {
                    return Err(EngineError::InvalidKind(
                        "transfer source and destination wallets must differ".to_string(),
                    ));
                }
            }
            TransactionKind::Income | TransactionKind::Expense => {
                if input.to_account_id.is_some() || input.to_wallet_id.is_some() {
                    return Err(EngineError::InvalidKind(format!(
                        "{} must not carry a destination",
                        input.kind.as_str()
                    )));
                }
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            kind: input.kind,
            amount_minor: input.amount_minor,
            account_id: input.account_id,
            wallet_id: input.wallet_id,
            to_account_id: input.to_account_id,
            to_wallet_id: input.to_wallet_id,
            category_id: input.category_id,
            note: input.note,
            occurred_at: input.occurred_at,
            deleted_at: None,
            parent_id: None,
            is_admin_fee: false,
            admin_fee_minor: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub account_id: String,
    pub wallet_id: String,
    pub to_account_id: Option<String>,
    pub to_wallet_id: Option<String>,
    pub category_id: Option<String>,
    pub note: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
    pub parent_id: Option<String>,
    pub is_admin_fee: bool,
    pub admin_fee_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            account_id: ActiveValue::Set(tx.account_id.clone()),
            wallet_id: ActiveValue::Set(tx.wallet_id.to_string()),
            to_account_id: ActiveValue::Set(tx.to_account_id.clone()),
            to_wallet_id: ActiveValue::Set(tx.to_wallet_id.map(|id| id.to_string())),
            category_id: ActiveValue::Set(tx.category_id.map(|id| id.to_string())),
            note: ActiveValue::Set(tx.note.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            deleted_at: ActiveValue::Set(tx.deleted_at),
            parent_id: ActiveValue::Set(tx.parent_id.map(|id| id.to_string())),
            is_admin_fee: ActiveValue::Set(tx.is_admin_fee),
            admin_fee_minor: ActiveValue::Set(tx.admin_fee_minor),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            user_id: model.user_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            account_id: model.account_id,
            wallet_id: Uuid::parse_str(&model.wallet_id)
                .map_err(|_| EngineError::KeyNotFound("wallet not exists".to_string()))?,
            to_account_id: model.to_account_id,
            to_wallet_id: model
                .to_wallet_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
            category_id: model.category_id.and_then(|s| Uuid::parse_str(&s).ok()),
            note: model.note,
            occurred_at: model.occurred_at,
            deleted_at: model.deleted_at,
            parent_id: model.parent_id.and_then(|s| Uuid::parse_str(&s).ok()),
            is_admin_fee: model.is_admin_fee,
            admin_fee_minor: model.admin_fee_minor,
        })
    }
}
