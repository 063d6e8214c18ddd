use crate::{
    error::{AppError, AppResult},
    models::{topic, Category, Reply, Topic, TopicModel},
    services::visibility::{can_view, Viewer},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, ModelTrait, QueryFilter, Statement, TransactionTrait,
};

/// Listing row: topic joined with author/category names and approved
/// reply stats.
#[derive(Debug, FromQueryResult)]
pub struct TopicListItem {
    pub id: i32,
    pub title: String,
    pub is_approved: bool,
    pub is_locked: bool,
    pub is_pinned: bool,
    pub view_count: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub author_name: String,
    pub category_name: String,
    pub reply_count: i64,
    pub last_reply_at: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
}

const LIST_COLUMNS: &str = "t.id, t.title, t.is_approved, t.is_locked, t.is_pinned, \
    t.view_count, t.user_id, t.category_id, \
    u.display_name AS author_name, c.name AS category_name, \
    (SELECT COUNT(*) FROM replies r WHERE r.topic_id = t.id AND r.is_approved) AS reply_count, \
    (SELECT MAX(r.created_at) FROM replies r WHERE r.topic_id = t.id AND r.is_approved) AS last_reply_at, \
    t.created_at";

pub struct TopicService {
    db: DatabaseConnection,
}

impl TopicService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Approved topics, pinned first, then by most recent activity: the
    /// newest approved reply, or the topic's own creation time while it has
    /// no approved replies.
    pub async fn list(
        &self,
        category_id: Option<i32>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<TopicListItem>, u64)> {
        let offset = page.saturating_sub(1) * per_page;

        let (count_sql, list_sql, mut values): (String, String, Vec<sea_orm::Value>) =
            if let Some(cid) = category_id {
                (
                    "SELECT COUNT(*) FROM topics WHERE is_approved = TRUE AND category_id = $1"
                        .to_string(),
                    format!(
                        "SELECT {LIST_COLUMNS} \
                        FROM topics t \
                        JOIN users u ON u.id = t.user_id \
                        JOIN categories c ON c.id = t.category_id \
                        WHERE t.is_approved = TRUE AND t.category_id = $1 \
                        ORDER BY t.is_pinned DESC, \
                        COALESCE((SELECT MAX(r.created_at) FROM replies r \
                            WHERE r.topic_id = t.id AND r.is_approved), t.created_at) DESC \
                        LIMIT $2 OFFSET $3"
                    ),
                    vec![cid.into()],
                )
            } else {
                (
                    "SELECT COUNT(*) FROM topics WHERE is_approved = TRUE".to_string(),
                    format!(
                        "SELECT {LIST_COLUMNS} \
                        FROM topics t \
                        JOIN users u ON u.id = t.user_id \
                        JOIN categories c ON c.id = t.category_id \
                        WHERE t.is_approved = TRUE \
                        ORDER BY t.is_pinned DESC, \
                        COALESCE((SELECT MAX(r.created_at) FROM replies r \
                            WHERE r.topic_id = t.id AND r.is_approved), t.created_at) DESC \
                        LIMIT $1 OFFSET $2"
                    ),
                    vec![],
                )
            };

        let count_result = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                &count_sql,
                values.clone(),
            ))
            .await?
            .ok_or(AppError::Internal(anyhow::anyhow!("Count query failed")))?;
        let total: i64 = count_result.try_get_by_index(0)?;

        values.push((per_page as i64).into());
        values.push((offset as i64).into());

        let topics = TopicListItem::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            &list_sql,
            values,
        ))
        .all(&self.db)
        .await?;

        Ok((topics, total as u64))
    }

    /// Plain lookup without visibility filtering or side effects. Used by
    /// mutation paths that apply their own authorization.
    pub async fn get_by_id(&self, id: i32) -> AppResult<TopicModel> {
        Topic::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Fetch a single topic for display, recording the view.
    ///
    /// The view counter is incremented synchronously unless the viewer is
    /// the topic's owner. A pending topic is indistinguishable from a
    /// missing one for viewers who may not see it.
    pub async fn get_and_record_view(&self, id: i32, viewer: Viewer) -> AppResult<TopicModel> {
        let mut topic = self.get_by_id(id).await?;

        if !can_view(topic.is_approved, topic.user_id, viewer) {
            return Err(AppError::NotFound);
        }

        if !viewer.is_owner(topic.user_id) {
            self.db
                .execute(Statement::from_sql_and_values(
                    sea_orm::DatabaseBackend::Postgres,
                    "UPDATE topics SET view_count = view_count + 1 WHERE id = $1",
                    [id.into()],
                ))
                .await?;
            topic.view_count += 1;
        }

        Ok(topic)
    }

    /// New topics always start pending.
    pub async fn create(
        &self,
        user_id: i32,
        category_id: i32,
        title: &str,
        content: &str,
    ) -> AppResult<TopicModel> {
        Category::find_by_id(category_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Validation("Category does not exist".to_string()))?;

        let now = chrono::Utc::now().naive_utc();

        let new_topic = topic::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            category_id: sea_orm::ActiveValue::Set(category_id),
            title: sea_orm::ActiveValue::Set(title.to_string()),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            is_approved: sea_orm::ActiveValue::Set(false),
            is_locked: sea_orm::ActiveValue::Set(false),
            is_pinned: sea_orm::ActiveValue::Set(false),
            view_count: sea_orm::ActiveValue::Set(0),
            approved_by_user_id: sea_orm::ActiveValue::Set(None),
            approved_at: sea_orm::ActiveValue::Set(None),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let created = new_topic.insert(&self.db).await?;
        Ok(created)
    }

    /// Owner-only edit. Editing sends the topic back through moderation:
    /// approval flag and approver metadata are cleared.
    pub async fn update(
        &self,
        id: i32,
        caller_id: i32,
        title: &str,
        content: &str,
    ) -> AppResult<TopicModel> {
        let existing = self.get_by_id(id).await?;
        if existing.user_id != caller_id {
            return Err(AppError::Forbidden);
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: topic::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(title.to_string());
        active.content = sea_orm::ActiveValue::Set(content.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.is_approved = sea_orm::ActiveValue::Set(false);
        active.approved_by_user_id = sea_orm::ActiveValue::Set(None);
        active.approved_at = sea_orm::ActiveValue::Set(None);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Owner or admin may delete. Replies go with the topic in the same
    /// transaction.
    pub async fn delete(&self, id: i32, caller_id: i32, is_admin: bool) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        if !is_admin && existing.user_id != caller_id {
            return Err(AppError::Forbidden);
        }

        let txn = self.db.begin().await?;
        Reply::delete_many()
            .filter(crate::models::reply::Column::TopicId.eq(id))
            .exec(&txn)
            .await?;
        existing.delete(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn set_locked(&self, id: i32, locked: bool) -> AppResult<TopicModel> {
        let existing = self.get_by_id(id).await?;
        let mut active: topic::ActiveModel = existing.into();
        active.is_locked = sea_orm::ActiveValue::Set(locked);
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn set_pinned(&self, id: i32, pinned: bool) -> AppResult<TopicModel> {
        let existing = self.get_by_id(id).await?;
        let mut active: topic::ActiveModel = existing.into();
        active.is_pinned = sea_orm::ActiveValue::Set(pinned);
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
