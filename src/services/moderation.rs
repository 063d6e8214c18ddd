use crate::{
    error::{AppError, AppResult},
    models::{reply, topic, user, Reply, Topic, User, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait,
    PaginatorTrait, QueryFilter, Statement, TransactionTrait,
};

/// Pending topic as shown in the moderation queue.
#[derive(Debug, FromQueryResult)]
pub struct PendingTopic {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub user_id: i32,
    pub author_name: String,
    pub category_name: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Pending reply as shown in the moderation queue, with enough topic
/// context to judge it.
#[derive(Debug, FromQueryResult)]
pub struct PendingReply {
    pub id: i32,
    pub topic_id: i32,
    pub topic_title: String,
    pub content: String,
    pub user_id: i32,
    pub author_name: String,
    pub created_at: chrono::NaiveDateTime,
}

pub struct ModerationService {
    db: DatabaseConnection,
}

impl ModerationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Pending topics, oldest submission first.
    pub async fn pending_topics(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<PendingTopic>, u64)> {
        let total = Topic::find()
            .filter(topic::Column::IsApproved.eq(false))
            .count(&self.db)
            .await?;

        let offset = page.saturating_sub(1) * per_page;

        let topics = PendingTopic::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT t.id, t.title, t.content, t.user_id, \
                u.display_name AS author_name, c.name AS category_name, t.created_at \
                FROM topics t \
                JOIN users u ON u.id = t.user_id \
                JOIN categories c ON c.id = t.category_id \
                WHERE t.is_approved = FALSE \
                ORDER BY t.created_at ASC \
                LIMIT $1 OFFSET $2",
            [(per_page as i64).into(), (offset as i64).into()],
        ))
        .all(&self.db)
        .await?;

        Ok((topics, total))
    }

    /// Pending replies, oldest submission first.
    pub async fn pending_replies(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<PendingReply>, u64)> {
        let total = Reply::find()
            .filter(reply::Column::IsApproved.eq(false))
            .count(&self.db)
            .await?;

        let offset = page.saturating_sub(1) * per_page;

        let replies = PendingReply::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT r.id, r.topic_id, t.title AS topic_title, r.content, r.user_id, \
                u.display_name AS author_name, r.created_at \
                FROM replies r \
                JOIN users u ON u.id = r.user_id \
                JOIN topics t ON t.id = r.topic_id \
                WHERE r.is_approved = FALSE \
                ORDER BY r.created_at ASC \
                LIMIT $1 OFFSET $2",
            [(per_page as i64).into(), (offset as i64).into()],
        ))
        .all(&self.db)
        .await?;

        Ok((replies, total))
    }

    /// Approve a topic, recording who approved it and when. Approving an
    /// already-approved topic just refreshes that record.
    pub async fn approve_topic(&self, id: i32, admin_id: i32) -> AppResult<()> {
        let existing = Topic::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: topic::ActiveModel = existing.into();
        active.is_approved = sea_orm::ActiveValue::Set(true);
        active.approved_by_user_id = sea_orm::ActiveValue::Set(Some(admin_id));
        active.approved_at = sea_orm::ActiveValue::Set(Some(chrono::Utc::now().naive_utc()));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Rejection is terminal: the topic and all its replies are deleted in
    /// one transaction.
    pub async fn reject_topic(&self, id: i32) -> AppResult<()> {
        let existing = Topic::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let txn = self.db.begin().await?;
        Reply::delete_many()
            .filter(reply::Column::TopicId.eq(id))
            .exec(&txn)
            .await?;
        existing.delete(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn approve_reply(&self, id: i32, admin_id: i32) -> AppResult<()> {
        let existing = Reply::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: reply::ActiveModel = existing.into();
        active.is_approved = sea_orm::ActiveValue::Set(true);
        active.approved_by_user_id = sea_orm::ActiveValue::Set(Some(admin_id));
        active.approved_at = sea_orm::ActiveValue::Set(Some(chrono::Utc::now().naive_utc()));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Rejection deletes the reply outright.
    pub async fn reject_reply(&self, id: i32) -> AppResult<()> {
        let existing = Reply::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        existing.delete(&self.db).await?;
        Ok(())
    }

    /// Ban deactivates the account. Existing approved content stays
    /// visible; the user just cannot authenticate anymore.
    pub async fn ban_user(&self, id: i32) -> AppResult<UserModel> {
        self.set_active(id, false).await
    }

    pub async fn unban_user(&self, id: i32) -> AppResult<UserModel> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: i32, is_active: bool) -> AppResult<UserModel> {
        let existing = User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: user::ActiveModel = existing.into();
        active.is_active = sea_orm::ActiveValue::Set(is_active);
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
