//! Timeline service.

use std::collections::HashMap;

use minitwit_common::AppResult;
use minitwit_db::{
    entities::{message, user},
    repositories::{FollowerRepository, MessageRepository, UserRepository},
};
use serde::Deserialize;
use validator::Validate;

/// A message joined with its author.
pub struct FeedEntry {
    pub message: message::Model,
    pub author: user::Model,
}

/// Input for posting a message.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageInput {
    #[validate(length(min = 1, max = 512))]
    pub text: String,
}

/// Timeline service for business logic.
#[derive(Clone)]
pub struct TimelineService {
    message_repo: MessageRepository,
    user_repo: UserRepository,
    follower_repo: FollowerRepository,
}

impl TimelineService {
    /// Create a new timeline service.
    #[must_use]
    pub const fn new(
        message_repo: MessageRepository,
        user_repo: UserRepository,
        follower_repo: FollowerRepository,
    ) -> Self {
        Self {
            message_repo,
            user_repo,
            follower_repo,
        }
    }

    /// Post a message from a named author.
    pub async fn create_message(
        &self,
        author_username: &str,
        input: CreateMessageInput,
    ) -> AppResult<message::Model> {
        input.validate()?;

        let message = self
            .message_repo
            .create(author_username, &input.text)
            .await?;

        tracing::debug!(
            message_id = message.id,
            author_id = message.author_id,
            "Recorded message"
        );

        Ok(message)
    }

    /// Post a message from an already-authenticated author.
    pub async fn create_message_as(
        &self,
        author_id: i64,
        input: CreateMessageInput,
    ) -> AppResult<message::Model> {
        input.validate()?;

        let message = self
            .message_repo
            .create_for_author(author_id, &input.text)
            .await?;

        tracing::debug!(
            message_id = message.id,
            author_id = message.author_id,
            "Recorded message"
        );

        Ok(message)
    }

    /// Get the global public timeline, newest first.
    pub async fn public_timeline(
        &self,
        limit: u64,
        include_flagged: bool,
    ) -> AppResult<Vec<FeedEntry>> {
        let messages = self
            .message_repo
            .find_public(limit, include_flagged)
            .await?;

        self.with_authors(messages).await
    }

    /// Get one named author's messages, newest first.
    pub async fn user_timeline(
        &self,
        username: &str,
        limit: u64,
        include_flagged: bool,
    ) -> AppResult<Vec<FeedEntry>> {
        let user = self.user_repo.get_by_username(username).await?;
        let messages = self
            .message_repo
            .find_by_author(user.id, limit, include_flagged)
            .await?;

        // Single author, no batched lookup needed
        Ok(messages
            .into_iter()
            .map(|message| FeedEntry {
                message,
                author: user.clone(),
            })
            .collect())
    }

    /// Get a user's personalized timeline: own messages plus messages
    /// from everyone they follow, newest first.
    pub async fn home_timeline(
        &self,
        user_id: i64,
        limit: u64,
        include_flagged: bool,
    ) -> AppResult<Vec<FeedEntry>> {
        let mut author_ids = self.follower_repo.following_ids(user_id).await?;
        author_ids.push(user_id);

        let messages = self
            .message_repo
            .find_by_authors(&author_ids, limit, include_flagged)
            .await?;

        self.with_authors(messages).await
    }

    /// Attach author identities to messages, preserving message order.
    async fn with_authors(&self, messages: Vec<message::Model>) -> AppResult<Vec<FeedEntry>> {
        let mut author_ids: Vec<i64> = messages.iter().map(|message| message.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors = self.user_repo.find_by_ids(&author_ids).await?;
        let by_id: HashMap<i64, user::Model> =
            authors.into_iter().map(|user| (user.id, user)).collect();

        // The FK guarantees every author row exists; a missing one
        // drops its entry rather than failing the whole feed
        Ok(messages
            .into_iter()
            .filter_map(|message| {
                by_id.get(&message.author_id).cloned().map(|author| FeedEntry {
                    message,
                    author,
                })
            })
            .collect())
    }
}
