//! Follower repository.

use std::sync::Arc;

use crate::entities::{follower, user, Follower, User};
use minitwit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

/// Follower repository for follow-graph operations.
///
/// Edges are directed: `who_id` follows `whom_id`. Nothing deduplicates
/// edges, so the same pair may appear more than once; removal always
/// targets a single edge by primary key.
#[derive(Clone)]
pub struct FollowerRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowerRepository {
    /// Create a new follower repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the oldest follow edge between a pair, if any.
    pub async fn find_by_pair(
        &self,
        who_id: i64,
        whom_id: i64,
    ) -> AppResult<Option<follower::Model>> {
        Follower::find()
            .filter(follower::Column::WhoId.eq(who_id))
            .filter(follower::Column::WhomId.eq(whom_id))
            .order_by_asc(follower::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether at least one follow edge exists between a pair.
    pub async fn exists(&self, who_id: i64, whom_id: i64) -> AppResult<bool> {
        Ok(self.find_by_pair(who_id, whom_id).await?.is_some())
    }

    /// Create a follow edge from an already-resolved follower to the named
    /// followee.
    ///
    /// Resolving the followee and inserting the edge run in one
    /// transaction. Existing edges between the pair are not consulted, so
    /// repeated calls stack additional edges.
    pub async fn create(&self, who_id: i64, whom_username: &str) -> AppResult<follower::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let whom = User::find()
            .filter(user::Column::Username.eq(whom_username))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::UnknownUser(whom_username.to_string()))?;

        let model = follower::ActiveModel {
            who_id: Set(who_id),
            whom_id: Set(whom.id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let edge = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edge)
    }

    /// Remove one follow edge from an already-resolved follower to the
    /// named followee.
    ///
    /// When several edges exist between the pair, the oldest is removed.
    pub async fn delete(&self, who_id: i64, whom_username: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let whom = User::find()
            .filter(user::Column::Username.eq(whom_username))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::UnknownUser(whom_username.to_string()))?;

        let edge = Follower::find()
            .filter(follower::Column::WhoId.eq(who_id))
            .filter(follower::Column::WhomId.eq(whom.id))
            .order_by_asc(follower::Column::Id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or(AppError::UnknownFollowerRelation {
                whom_id: whom.id,
                who_id,
            })?;

        Follower::delete_by_id(edge.id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Remove one follow edge between two named users.
    ///
    /// The followee is resolved before the follower, so when both names
    /// are unregistered the followee is the one reported.
    pub async fn delete_by_usernames(
        &self,
        whom_username: &str,
        who_username: &str,
    ) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let whom = User::find()
            .filter(user::Column::Username.eq(whom_username))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::UnknownUser(whom_username.to_string()))?;

        let who = User::find()
            .filter(user::Column::Username.eq(who_username))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::UnknownUser(who_username.to_string()))?;

        let edge = Follower::find()
            .filter(follower::Column::WhoId.eq(who.id))
            .filter(follower::Column::WhomId.eq(whom.id))
            .order_by_asc(follower::Column::Id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or(AppError::UnknownFollowerRelation {
                whom_id: whom.id,
                who_id: who.id,
            })?;

        Follower::delete_by_id(edge.id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// List follow edges pointing at a user, newest edge first.
    pub async fn find_followers(
        &self,
        whom_id: i64,
        limit: u64,
    ) -> AppResult<Vec<follower::Model>> {
        Follower::find()
            .filter(follower::Column::WhomId.eq(whom_id))
            .order_by_desc(follower::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List follow edges leaving a user, newest edge first.
    pub async fn find_following(
        &self,
        who_id: i64,
        limit: u64,
    ) -> AppResult<Vec<follower::Model>> {
        Follower::find()
            .filter(follower::Column::WhoId.eq(who_id))
            .order_by_desc(follower::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of every user the given user follows.
    pub async fn following_ids(&self, who_id: i64) -> AppResult<Vec<i64>> {
        let edges = Follower::find()
            .filter(follower::Column::WhoId.eq(who_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edges.into_iter().map(|edge| edge.whom_id).collect())
    }
}
