//! The module contains the `Wallet` struct and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::EngineError;

/// A wallet.
///
/// A wallet is a representation of a real wallet, a bank account or anything
/// else where money is kept. Each wallet belongs to exactly one account.
///
/// `balance_minor` is the authoritative running total for the wallet: it is
/// mutated only by the ledger operations in response to transaction lifecycle
/// events (plus the opening balance set at creation time).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    pub id: Uuid,
    pub name: String,
    pub account_id: String,
    pub user_id: String,
    pub balance_minor: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Wallet {
    pub fn new(name: String, account_id: &str, user_id: &str, balance_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            account_id: account_id.to_string(),
            user_id: user_id.to_string(),
            balance_minor,
            deleted_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub account_id: String,
    pub user_id: String,
    pub balance: i64,
    pub deleted_at: Option<DateTimeUtc>,
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
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            account_id: ActiveValue::Set(value.account_id.clone()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            balance: ActiveValue::Set(value.balance_minor),
            deleted_at: ActiveValue::Set(value.deleted_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("wallet not exists".to_string()))?,
            name: model.name,
            account_id: model.account_id,
            user_id: model.user_id,
            balance_minor: model.balance,
            deleted_at: model.deleted_at,
        })
    }
}
