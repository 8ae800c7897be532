use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    ADMIN_FEE_CATEGORY, Category, CategoryKind, EngineError, ResultEngine, categories,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new category for a user. Names are unique per user,
    /// case-insensitively.
    pub async fn new_category(
        &self,
        name: &str,
        kind: CategoryKind,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let exists = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .filter(categories::Column::DeletedAt.is_null())
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let category = Category::new(name, kind, user_id);
            let category_id = category.id;
            categories::ActiveModel::from(&category).insert(&db_tx).await?;
            Ok(category_id)
        })
    }

    /// Lists the user's active categories.
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models: Vec<categories::Model> = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .filter(categories::Column::DeletedAt.is_null())
                .all(&db_tx)
                .await?;
            models.into_iter().map(Category::try_from).collect()
        })
    }

    /// Finds the user's "Admin Fee" expense category, creating it on first
    /// use. Admin-fee children are always filed under it.
    pub(super) async fn ensure_admin_fee_category(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        let existing = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .filter(categories::Column::DeletedAt.is_null())
            .filter(Expr::cust("LOWER(name)").eq(ADMIN_FEE_CATEGORY.to_lowercase()))
            .one(db)
            .await?;
        if let Some(model) = existing {
            return Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("category not exists".to_string()));
        }

        let category = Category::new(
            ADMIN_FEE_CATEGORY.to_string(),
            CategoryKind::Expense,
            user_id,
        );
        let category_id = category.id;
        categories::ActiveModel::from(&category).insert(db).await?;
        Ok(category_id)
    }
}
