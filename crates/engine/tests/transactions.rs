use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    ADMIN_FEE_CATEGORY, CategoryKind, CreateTransactionCmd, Currency, Engine, EngineError,
    TransactionKind, TransactionListFilter, UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

/// One account with one wallet holding `opening` minor units.
async fn account_with_wallet(engine: &Engine, opening: i64) -> (String, Uuid) {
    let account_id = engine.new_account("Main", "alice", None).await.unwrap();
    let wallet_id = engine
        .new_wallet(&account_id, "Cash", opening, "alice")
        .await
        .unwrap();
    (account_id, wallet_id)
}

async fn wallet_balance(engine: &Engine, wallet_id: Uuid) -> i64 {
    engine.wallet(wallet_id, "alice").await.unwrap().balance_minor
}

async fn account_balance(engine: &Engine, account_id: &str) -> i64 {
    engine.account(account_id, "alice").await.unwrap().balance_minor
}

fn income(amount: i64, account_id: &str, wallet_id: Uuid) -> CreateTransactionCmd {
    CreateTransactionCmd::new(
        "alice",
        TransactionKind::Income,
        amount,
        account_id,
        wallet_id,
        Utc::now(),
    )
}

fn expense(amount: i64, account_id: &str, wallet_id: Uuid) -> CreateTransactionCmd {
    CreateTransactionCmd::new(
        "alice",
        TransactionKind::Expense,
        amount,
        account_id,
        wallet_id,
        Utc::now(),
    )
}

fn transfer(
    amount: i64,
    account_id: &str,
    wallet_id: Uuid,
    to_account_id: &str,
    to_wallet_id: Uuid,
) -> CreateTransactionCmd {
    CreateTransactionCmd::new(
        "alice",
        TransactionKind::Transfer,
        amount,
        account_id,
        wallet_id,
        Utc::now(),
    )
    .destination(to_account_id, to_wallet_id)
}

#[tokio::test]
async fn income_applies_to_wallet_and_account() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 0).await;

    engine
        .create_transaction(income(1000, &account_id, wallet_id))
        .await
        .unwrap();

    assert_eq!(wallet_balance(&engine, wallet_id).await, 1000);
    assert_eq!(account_balance(&engine, &account_id).await, 1000);
}

#[tokio::test]
async fn expense_deducts_from_wallet() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 1000).await;

    engine
        .create_transaction(expense(300, &account_id, wallet_id))
        .await
        .unwrap();

    assert_eq!(wallet_balance(&engine, wallet_id).await, 700);
    assert_eq!(account_balance(&engine, &account_id).await, 700);
}

#[tokio::test]
async fn transfer_updates_both_accounts_independently() {
    let (engine, _db) = engine_with_db().await;
    let account_a = engine.new_account("A", "alice", None).await.unwrap();
    let account_b = engine.new_account("B", "alice", None).await.unwrap();
    let w1 = engine.new_wallet(&account_a, "W1", 700, "alice").await.unwrap();
    let w2 = engine.new_wallet(&account_b, "W2", 0, "alice").await.unwrap();

    engine
        .create_transaction(transfer(200, &account_a, w1, &account_b, w2))
        .await
        .unwrap();

    assert_eq!(wallet_balance(&engine, w1).await, 500);
    assert_eq!(wallet_balance(&engine, w2).await, 200);
    assert_eq!(account_balance(&engine, &account_a).await, 500);
    assert_eq!(account_balance(&engine, &account_b).await, 200);
}

#[tokio::test]
async fn update_reverts_old_effects_then_applies_new() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 700).await;

    let tx_id = engine
        .create_transaction(expense(300, &account_id, wallet_id))
        .await
        .unwrap();
    assert_eq!(wallet_balance(&engine, wallet_id).await, 400);

    engine
        .update_transaction(UpdateTransactionCmd::new(tx_id, "alice").amount_minor(500))
        .await
        .unwrap();

    assert_eq!(wallet_balance(&engine, wallet_id).await, 200);
    assert_eq!(account_balance(&engine, &account_id).await, 200);
}

#[tokio::test]
async fn update_applies_net_effect_once() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 0).await;

    let tx_id = engine
        .create_transaction(income(100, &account_id, wallet_id))
        .await
        .unwrap();

    // A double-run of the revert/apply sequence would land on 20, not 60.
    engine
        .update_transaction(UpdateTransactionCmd::new(tx_id, "alice").amount_minor(60))
        .await
        .unwrap();

    assert_eq!(wallet_balance(&engine, wallet_id).await, 60);
    assert_eq!(account_balance(&engine, &account_id).await, 60);
}

#[tokio::test]
async fn update_kind_change_to_transfer_moves_destination() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("Main", "alice", None).await.unwrap();
    let w1 = engine.new_wallet(&account_id, "W1", 500, "alice").await.unwrap();
    let w2 = engine.new_wallet(&account_id, "W2", 0, "alice").await.unwrap();

    let tx_id = engine
        .create_transaction(expense(200, &account_id, w1))
        .await
        .unwrap();
    assert_eq!(wallet_balance(&engine, w1).await, 300);

    engine
        .update_transaction(
            UpdateTransactionCmd::new(tx_id, "alice")
                .kind(TransactionKind::Transfer)
                .destination(account_id.clone(), w2),
        )
        .await
        .unwrap();

    assert_eq!(wallet_balance(&engine, w1).await, 300);
    assert_eq!(wallet_balance(&engine, w2).await, 200);
    assert_eq!(account_balance(&engine, &account_id).await, 500);
}

#[tokio::test]
async fn delete_restores_pre_apply_balances() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 0).await;

    let tx_id = engine
        .create_transaction(income(1000, &account_id, wallet_id))
        .await
        .unwrap();
    assert_eq!(wallet_balance(&engine, wallet_id).await, 1000);

    engine
        .delete_transaction(tx_id, "alice", Utc::now())
        .await
        .unwrap();

    assert_eq!(wallet_balance(&engine, wallet_id).await, 0);
    assert_eq!(account_balance(&engine, &account_id).await, 0);

    let err = engine
        .delete_transaction(tx_id, "alice", Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
}

#[tokio::test]
async fn wallet_balance_matches_net_of_active_transactions() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("Main", "alice", None).await.unwrap();
    let w1 = engine.new_wallet(&account_id, "W1", 0, "alice").await.unwrap();
    let w2 = engine.new_wallet(&account_id, "W2", 0, "alice").await.unwrap();

    engine
        .create_transaction(income(1000, &account_id, w1))
        .await
        .unwrap();
    engine
        .create_transaction(expense(300, &account_id, w1))
        .await
        .unwrap();
    engine
        .create_transaction(transfer(200, &account_id, w1, &account_id, w2))
        .await
        .unwrap();
    engine
        .create_transaction(income(50, &account_id, w2))
        .await
        .unwrap();
    engine
        .create_transaction(transfer(50, &account_id, w2, &account_id, w1))
        .await
        .unwrap();

    let txs = engine
        .list_transactions("alice", TransactionListFilter::default().wallet_id(w1))
        .await
        .unwrap();
    let net: i64 = txs
        .iter()
        .map(|t| match t.kind {
            TransactionKind::Income => t.amount_minor,
            TransactionKind::Expense => -t.amount_minor,
            TransactionKind::Transfer if t.wallet_id == w1 => -t.amount_minor,
            TransactionKind::Transfer => t.amount_minor,
        })
        .sum();

    assert_eq!(wallet_balance(&engine, w1).await, net);
    assert_eq!(wallet_balance(&engine, w1).await, 550);
    assert_eq!(wallet_balance(&engine, w2).await, 200);
    assert_eq!(account_balance(&engine, &account_id).await, 750);
}

#[tokio::test]
async fn admin_fee_creates_independent_expense_child() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 1000).await;

    let parent_id = engine
        .create_transaction(expense(300, &account_id, wallet_id).admin_fee_minor(50))
        .await
        .unwrap();

    // Combined effect on the source wallet: -(amount) - (fee).
    assert_eq!(wallet_balance(&engine, wallet_id).await, 650);
    assert_eq!(account_balance(&engine, &account_id).await, 650);

    let txs = engine
        .list_transactions("alice", TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(txs.len(), 2);
    let child = txs
        .iter()
        .find(|t| t.is_admin_fee)
        .expect("admin-fee child missing");
    assert_eq!(child.parent_id, Some(parent_id));
    assert_eq!(child.kind, TransactionKind::Expense);
    assert_eq!(child.amount_minor, 50);
    assert_eq!(child.wallet_id, wallet_id);

    let categories = engine.list_categories("alice").await.unwrap();
    assert!(
        categories
            .iter()
            .any(|c| c.name == ADMIN_FEE_CATEGORY && c.kind == CategoryKind::Expense)
    );
}

#[tokio::test]
async fn deleting_parent_keeps_admin_fee_child() {
    let (engine, _db) = engine_with_db().await;
    let account_a = engine.new_account("A", "alice", None).await.unwrap();
    let account_b = engine.new_account("B", "alice", None).await.unwrap();
    let w1 = engine.new_wallet(&account_a, "W1", 1000, "alice").await.unwrap();
    let w2 = engine.new_wallet(&account_b, "W2", 0, "alice").await.unwrap();

    let parent_id = engine
        .create_transaction(transfer(200, &account_a, w1, &account_b, w2).admin_fee_minor(25))
        .await
        .unwrap();
    assert_eq!(wallet_balance(&engine, w1).await, 775);

    engine
        .delete_transaction(parent_id, "alice", Utc::now())
        .await
        .unwrap();

    // Only the parent's effect is reverted; the fee stands.
    assert_eq!(wallet_balance(&engine, w1).await, 975);
    assert_eq!(wallet_balance(&engine, w2).await, 0);
    assert_eq!(account_balance(&engine, &account_a).await, 975);

    let txs = engine
        .list_transactions("alice", TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert!(txs[0].is_admin_fee);
}

#[tokio::test]
async fn updating_parent_keeps_admin_fee_child() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 1000).await;

    let parent_id = engine
        .create_transaction(expense(300, &account_id, wallet_id).admin_fee_minor(50))
        .await
        .unwrap();
    assert_eq!(wallet_balance(&engine, wallet_id).await, 650);

    engine
        .update_transaction(UpdateTransactionCmd::new(parent_id, "alice").amount_minor(100))
        .await
        .unwrap();

    // The parent is re-applied at the new amount; the fee child stands.
    assert_eq!(wallet_balance(&engine, wallet_id).await, 850);
    assert_eq!(account_balance(&engine, &account_id).await, 850);

    let txs = engine
        .list_transactions("alice", TransactionListFilter::default())
        .await
        .unwrap();
    let child = txs
        .iter()
        .find(|t| t.is_admin_fee)
        .expect("admin-fee child missing");
    assert_eq!(child.amount_minor, 50);
    assert_eq!(child.parent_id, Some(parent_id));
}

#[tokio::test]
async fn transfer_to_missing_wallet_leaves_source_untouched() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 500).await;

    let err = engine
        .create_transaction(transfer(
            200,
            &account_id,
            wallet_id,
            &account_id,
            Uuid::new_v4(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("wallet not exists".to_string()));

    assert_eq!(wallet_balance(&engine, wallet_id).await, 500);
    assert_eq!(account_balance(&engine, &account_id).await, 500);
    let txs = engine
        .list_transactions("alice", TransactionListFilter::default())
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn cross_currency_transfer_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account_a = engine
        .new_account("Euros", "alice", Some(Currency::Eur))
        .await
        .unwrap();
    let account_b = engine
        .new_account("Dollars", "alice", Some(Currency::Usd))
        .await
        .unwrap();
    let w1 = engine.new_wallet(&account_a, "W1", 500, "alice").await.unwrap();
    let w2 = engine.new_wallet(&account_b, "W2", 0, "alice").await.unwrap();

    let err = engine
        .create_transaction(transfer(100, &account_a, w1, &account_b, w2))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CurrencyMismatch(_)));
    assert_eq!(wallet_balance(&engine, w1).await, 500);
}

#[tokio::test]
async fn category_kind_must_match_transaction_kind() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 500).await;
    let salary = engine
        .new_category("Salary", CategoryKind::Income, "alice")
        .await
        .unwrap();

    let err = engine
        .create_transaction(expense(100, &account_id, wallet_id).category_id(salary))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidKind("category kind does not match transaction kind".to_string())
    );
}

#[tokio::test]
async fn opening_balance_counts_toward_account() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("Main", "alice", None).await.unwrap();
    engine.new_wallet(&account_id, "W1", 250, "alice").await.unwrap();
    engine.new_wallet(&account_id, "W2", 100, "alice").await.unwrap();

    assert_eq!(account_balance(&engine, &account_id).await, 350);
}

#[tokio::test]
async fn deleting_wallet_recalculates_account() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("Main", "alice", None).await.unwrap();
    let w1 = engine.new_wallet(&account_id, "W1", 100, "alice").await.unwrap();
    engine.new_wallet(&account_id, "W2", 50, "alice").await.unwrap();
    assert_eq!(account_balance(&engine, &account_id).await, 150);

    engine.delete_wallet(w1, "alice", Utc::now()).await.unwrap();
    assert_eq!(account_balance(&engine, &account_id).await, 50);
}

#[tokio::test]
async fn account_deletion_requires_no_active_wallets() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 0).await;

    let err = engine
        .delete_account(&account_id, "alice", Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("account still has active wallets".to_string())
    );

    engine
        .delete_wallet(wallet_id, "alice", Utc::now())
        .await
        .unwrap();
    engine
        .delete_account(&account_id, "alice", Utc::now())
        .await
        .unwrap();
    assert!(engine.account(&account_id, "alice").await.is_err());
}

#[tokio::test]
async fn duplicate_account_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine.new_account("Main", "alice", None).await.unwrap();

    let err = engine.new_account("main", "alice", None).await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("main".to_string()));
}

#[tokio::test]
async fn list_filters_by_kind_and_hides_deleted() {
    let (engine, _db) = engine_with_db().await;
    let (account_id, wallet_id) = account_with_wallet(&engine, 1000).await;

    engine
        .create_transaction(income(100, &account_id, wallet_id))
        .await
        .unwrap();
    let expense_id = engine
        .create_transaction(expense(40, &account_id, wallet_id))
        .await
        .unwrap();
    engine
        .delete_transaction(expense_id, "alice", Utc::now())
        .await
        .unwrap();

    let incomes = engine
        .list_transactions(
            "alice",
            TransactionListFilter::default().kind(TransactionKind::Income),
        )
        .await
        .unwrap();
    assert_eq!(incomes.len(), 1);

    let active = engine
        .list_transactions("alice", TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    let all = engine
        .list_transactions("alice", TransactionListFilter::default().include_deleted())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn account_statistics_sums_active_income_and_expense() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("Main", "alice", None).await.unwrap();
    let w1 = engine.new_wallet(&account_id, "W1", 0, "alice").await.unwrap();
    let w2 = engine.new_wallet(&account_id, "W2", 0, "alice").await.unwrap();

    engine
        .create_transaction(income(1000, &account_id, w1))
        .await
        .unwrap();
    engine
        .create_transaction(expense(300, &account_id, w1))
        .await
        .unwrap();
    // Transfers are neither income nor expense.
    engine
        .create_transaction(transfer(100, &account_id, w1, &account_id, w2))
        .await
        .unwrap();
    let deleted = engine
        .create_transaction(expense(50, &account_id, w1))
        .await
        .unwrap();
    engine
        .delete_transaction(deleted, "alice", Utc::now())
        .await
        .unwrap();

    let stats = engine.account_statistics(&account_id, "alice").await.unwrap();
    assert_eq!(stats.balance_minor, 700);
    assert_eq!(stats.income_minor, 1000);
    assert_eq!(stats.expense_minor, 300);
}

#[tokio::test]
async fn other_users_cannot_see_or_touch_rows() {
    let (engine, db) = engine_with_db().await;
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["bob".into(), "password".into()],
    ))
    .await
    .unwrap();
    let (account_id, wallet_id) = account_with_wallet(&engine, 100).await;

    assert!(engine.account(&account_id, "bob").await.is_err());
    assert!(engine.wallet(wallet_id, "bob").await.is_err());

    let cmd = CreateTransactionCmd::new(
        "bob",
        TransactionKind::Expense,
        10,
        account_id.clone(),
        wallet_id,
        Utc::now(),
    );
    let err = engine.create_transaction(cmd).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));
    assert_eq!(wallet_balance(&engine, wallet_id).await, 100);
}
