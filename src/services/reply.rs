use crate::{
    error::{AppError, AppResult},
    models::{reply, Reply, ReplyModel, Topic},
    services::visibility::{can_view, Viewer},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait,
    PaginatorTrait, QueryFilter, Statement,
};

/// Reply row joined with its author's display name.
#[derive(Debug, FromQueryResult)]
pub struct ReplyListItem {
    pub id: i32,
    pub topic_id: i32,
    pub user_id: i32,
    pub content: String,
    pub is_approved: bool,
    pub author_name: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

pub struct ReplyService {
    db: DatabaseConnection,
}

impl ReplyService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Approved replies under a topic, oldest first. The parent topic must
    /// itself be visible to the viewer.
    pub async fn list_by_topic(
        &self,
        topic_id: i32,
        viewer: Viewer,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ReplyListItem>, u64)> {
        let topic = Topic::find_by_id(topic_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if !can_view(topic.is_approved, topic.user_id, viewer) {
            return Err(AppError::NotFound);
        }

        let total = Reply::find()
            .filter(reply::Column::TopicId.eq(topic_id))
            .filter(reply::Column::IsApproved.eq(true))
            .count(&self.db)
            .await?;

        let offset = page.saturating_sub(1) * per_page;

        let replies = ReplyListItem::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT r.id, r.topic_id, r.user_id, r.content, r.is_approved, \
                u.display_name AS author_name, r.created_at, r.updated_at \
                FROM replies r \
                JOIN users u ON u.id = r.user_id \
                WHERE r.topic_id = $1 AND r.is_approved = TRUE \
                ORDER BY r.created_at ASC \
                LIMIT $2 OFFSET $3",
            [
                topic_id.into(),
                (per_page as i64).into(),
                (offset as i64).into(),
            ],
        ))
        .all(&self.db)
        .await?;

        Ok((replies, total))
    }

    /// Plain lookup for mutation paths.
    pub async fn get_by_id(&self, id: i32) -> AppResult<ReplyModel> {
        Reply::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Fetch one reply with the visibility rule applied.
    pub async fn get(&self, id: i32, viewer: Viewer) -> AppResult<ReplyModel> {
        let reply = self.get_by_id(id).await?;
        if !can_view(reply.is_approved, reply.user_id, viewer) {
            return Err(AppError::NotFound);
        }
        Ok(reply)
    }

    /// Post a reply. The parent topic is loaded first: missing topic is
    /// NotFound, a locked topic rejects the reply with Conflict for every
    /// caller including admins. Locking is prospective only.
    pub async fn create(&self, user_id: i32, topic_id: i32, content: &str) -> AppResult<ReplyModel> {
        let topic = Topic::find_by_id(topic_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if topic.is_locked {
            return Err(AppError::Conflict(
                "Topic is locked and does not accept new replies".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();

        let new_reply = reply::ActiveModel {
            topic_id: sea_orm::ActiveValue::Set(topic_id),
            user_id: sea_orm::ActiveValue::Set(user_id),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            is_approved: sea_orm::ActiveValue::Set(false),
            approved_by_user_id: sea_orm::ActiveValue::Set(None),
            approved_at: sea_orm::ActiveValue::Set(None),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let created = new_reply.insert(&self.db).await?;
        Ok(created)
    }

    /// Owner-only edit. Clears approval so the reply re-enters moderation.
    pub async fn update(&self, id: i32, caller_id: i32, content: &str) -> AppResult<ReplyModel> {
        let existing = self.get_by_id(id).await?;
        if existing.user_id != caller_id {
            return Err(AppError::Forbidden);
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: reply::ActiveModel = existing.into();
        active.content = sea_orm::ActiveValue::Set(content.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.is_approved = sea_orm::ActiveValue::Set(false);
        active.approved_by_user_id = sea_orm::ActiveValue::Set(None);
        active.approved_at = sea_orm::ActiveValue::Set(None);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, caller_id: i32, is_admin: bool) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        if !is_admin && existing.user_id != caller_id {
            return Err(AppError::Forbidden);
        }

        existing.delete(&self.db).await?;
        Ok(())
    }
}
