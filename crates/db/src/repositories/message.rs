//! Message repository.

use std::sync::Arc;

use crate::entities::{message, user, Message, User};
use minitwit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, TransactionTrait,
};

/// Message repository for the append-only message log.
///
/// Reads page newest first: `published_at` descending, then `id`
/// descending so same-instant messages keep their insertion order.
/// Flagged messages are excluded unless `include_flagged` is set.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<DatabaseConnection>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record a message for the named author.
    ///
    /// Resolving the author and inserting the message run in one
    /// transaction.
    pub async fn create(&self, author_username: &str, text: &str) -> AppResult<message::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let author = User::find()
            .filter(user::Column::Username.eq(author_username))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::UnknownUser(author_username.to_string()))?;

        let model = message::ActiveModel {
            author_id: Set(author.id),
            text: Set(text.to_string()),
            published_at: Set(chrono::Utc::now().into()),
            flagged: Set(false),
            ..Default::default()
        };

        let message = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(message)
    }

    /// Record a message for an already-resolved author.
    pub async fn create_for_author(&self, author_id: i64, text: &str) -> AppResult<message::Model> {
        let model = message::ActiveModel {
            author_id: Set(author_id),
            text: Set(text.to_string()),
            published_at: Set(chrono::Utc::now().into()),
            flagged: Set(false),
            ..Default::default()
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the newest messages from all authors.
    pub async fn find_public(
        &self,
        limit: u64,
        include_flagged: bool,
    ) -> AppResult<Vec<message::Model>> {
        self.run_feed_query(Message::find(), limit, include_flagged)
            .await
    }

    /// List the newest messages from one author.
    pub async fn find_by_author(
        &self,
        author_id: i64,
        limit: u64,
        include_flagged: bool,
    ) -> AppResult<Vec<message::Model>> {
        let query = Message::find().filter(message::Column::AuthorId.eq(author_id));
        self.run_feed_query(query, limit, include_flagged).await
    }

    /// List the newest messages from a set of authors.
    pub async fn find_by_authors(
        &self,
        author_ids: &[i64],
        limit: u64,
        include_flagged: bool,
    ) -> AppResult<Vec<message::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        let query = Message::find().filter(message::Column::AuthorId.is_in(author_ids.to_vec()));
        self.run_feed_query(query, limit, include_flagged).await
    }

    async fn run_feed_query(
        &self,
        mut query: Select<Message>,
        limit: u64,
        include_flagged: bool,
    ) -> AppResult<Vec<message::Model>> {
        if !include_flagged {
            query = query.filter(message::Column::Flagged.eq(false));
        }

        query
            .order_by_desc(message::Column::PublishedAt)
            .order_by_desc(message::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
