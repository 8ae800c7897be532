//! The `Account` groups the user's wallets. The user can have multiple
//! accounts, each with its own currency.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{Currency, EngineError};

/// Top-level grouping of wallets.
///
/// `balance_minor` is derived: it always equals the sum of the balances of the
/// account's non-deleted wallets and is rewritten by
/// [`Engine::recalculate_account_balance`] after every wallet mutation. It is
/// never authoritative on its own.
///
/// [`Engine::recalculate_account_balance`]: crate::Engine::recalculate_account_balance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub currency: Currency,
    pub balance_minor: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(name: String, user_id: &str, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            user_id: user_id.to_string(),
            currency,
            balance_minor: 0,
            deleted_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub currency: String,
    pub balance: i64,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallets::Entity")]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            balance: ActiveValue::Set(value.balance_minor),
            deleted_at: ActiveValue::Set(value.deleted_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            user_id: model.user_id,
            currency: Currency::try_from(model.currency.as_str())?,
            balance_minor: model.balance,
            deleted_at: model.deleted_at,
        })
    }
}
