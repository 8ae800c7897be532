pub use accounts::Account;
pub use categories::{ADMIN_FEE_CATEGORY, Category, CategoryKind};
pub use commands::{CreateTransactionCmd, UpdateTransactionCmd};
pub use currency::Currency;
pub use error::EngineError;
pub use ledger::{BalanceEffect, balance_effects, invert, touched_accounts};
pub use ops::{AccountStats, Engine, EngineBuilder, TransactionListFilter};
pub use transactions::{Transaction, TransactionKind};
pub use wallets::Wallet;

mod accounts;
mod categories;
mod commands;
mod currency;
mod error;
mod ledger;
mod ops;
mod transactions;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
