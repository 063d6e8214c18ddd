use crate::{
    error::{AppError, AppResult},
    models::{category, topic, Category, CategoryModel, Topic},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, Statement,
};

/// Category row joined with its approved-topic count.
#[derive(Debug, FromQueryResult)]
pub struct CategoryWithCount {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub topic_count: i64,
}

pub struct CategoryService {
    db: DatabaseConnection,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Active categories ordered by sort_order then name, with approved
    /// topic counts.
    pub async fn list(&self) -> AppResult<Vec<CategoryWithCount>> {
        let sql = "SELECT c.id, c.name, c.description, c.sort_order, c.is_active, \
            c.created_at, c.updated_at, \
            COUNT(t.id) FILTER (WHERE t.is_approved) AS topic_count \
            FROM categories c \
            LEFT JOIN topics t ON t.category_id = c.id \
            WHERE c.is_active = TRUE \
            GROUP BY c.id \
            ORDER BY c.sort_order ASC, c.name ASC";

        let categories = CategoryWithCount::find_by_statement(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            sql.to_string(),
        ))
        .all(&self.db)
        .await?;

        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CategoryWithCount> {
        let sql = "SELECT c.id, c.name, c.description, c.sort_order, c.is_active, \
            c.created_at, c.updated_at, \
            COUNT(t.id) FILTER (WHERE t.is_approved) AS topic_count \
            FROM categories c \
            LEFT JOIN topics t ON t.category_id = c.id \
            WHERE c.id = $1 \
            GROUP BY c.id";

        CategoryWithCount::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            [id.into()],
        ))
        .one(&self.db)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        name: &str,
        description: &str,
        sort_order: i32,
    ) -> AppResult<CategoryModel> {
        let now = chrono::Utc::now().naive_utc();

        let new_category = category::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.to_string()),
            description: sea_orm::ActiveValue::Set(description.to_string()),
            sort_order: sea_orm::ActiveValue::Set(sort_order),
            is_active: sea_orm::ActiveValue::Set(true),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let created = new_category.insert(&self.db).await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        name: &str,
        description: &str,
        sort_order: i32,
        is_active: bool,
    ) -> AppResult<CategoryModel> {
        let existing = Category::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();

        let mut active: category::ActiveModel = existing.into();
        active.name = sea_orm::ActiveValue::Set(name.to_string());
        active.description = sea_orm::ActiveValue::Set(description.to_string());
        active.sort_order = sea_orm::ActiveValue::Set(sort_order);
        active.is_active = sea_orm::ActiveValue::Set(is_active);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete a category. With topics still referencing it the category is
    /// deactivated instead of dropped, so existing content keeps a home.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let existing = Category::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let topic_count = Topic::find()
            .filter(topic::Column::CategoryId.eq(id))
            .count(&self.db)
            .await?;

        if topic_count > 0 {
            let mut active: category::ActiveModel = existing.into();
            active.is_active = sea_orm::ActiveValue::Set(false);
            active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
            active.update(&self.db).await?;
            return Ok(());
        }

        Category::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
