//! Follow service.

use std::collections::HashMap;

use minitwit_common::AppResult;
use minitwit_db::{
    entities::user,
    repositories::{FollowerRepository, UserRepository},
};

/// Follow service for business logic.
///
/// Edges are directed from the follower to the followee. The same pair
/// may hold several edges at once; each unfollow removes exactly one.
#[derive(Clone)]
pub struct FollowService {
    follower_repo: FollowerRepository,
    user_repo: UserRepository,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follower_repo: FollowerRepository, user_repo: UserRepository) -> Self {
        Self {
            follower_repo,
            user_repo,
        }
    }

    /// Record a follow edge between two named users.
    ///
    /// The follower is resolved before the followee, so when both names
    /// are unregistered the follower is the one reported.
    pub async fn follow(&self, who_username: &str, whom_username: &str) -> AppResult<()> {
        let who = self.user_repo.get_by_username(who_username).await?;
        let edge = self.follower_repo.create(who.id, whom_username).await?;

        tracing::debug!(
            who_id = edge.who_id,
            whom_id = edge.whom_id,
            "Recorded follow edge"
        );

        Ok(())
    }

    /// Record a follow edge from an already-authenticated follower.
    pub async fn follow_as(&self, who_id: i64, whom_username: &str) -> AppResult<()> {
        let edge = self.follower_repo.create(who_id, whom_username).await?;

        tracing::debug!(
            who_id = edge.who_id,
            whom_id = edge.whom_id,
            "Recorded follow edge"
        );

        Ok(())
    }

    /// Remove one follow edge between two named users.
    ///
    /// The followee comes first and is resolved first, so when both
    /// names are unregistered the followee is the one reported.
    pub async fn unfollow(&self, whom_username: &str, who_username: &str) -> AppResult<()> {
        self.follower_repo
            .delete_by_usernames(whom_username, who_username)
            .await
    }

    /// Remove one follow edge from an already-authenticated follower.
    pub async fn unfollow_as(&self, who_id: i64, whom_username: &str) -> AppResult<()> {
        self.follower_repo.delete(who_id, whom_username).await
    }

    /// List the users following the named user, newest edge first.
    pub async fn list_followers(&self, username: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let user = self.user_repo.get_by_username(username).await?;
        let edges = self.follower_repo.find_followers(user.id, limit).await?;

        let who_ids: Vec<i64> = edges.iter().map(|edge| edge.who_id).collect();
        let users = self.user_repo.find_by_ids(&who_ids).await?;
        let by_id: HashMap<i64, user::Model> =
            users.into_iter().map(|user| (user.id, user)).collect();

        // Edge order drives the result; duplicate edges repeat their user
        Ok(edges
            .iter()
            .filter_map(|edge| by_id.get(&edge.who_id).cloned())
            .collect())
    }

    /// List the users the named user follows, newest edge first.
    pub async fn list_following(&self, username: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let user = self.user_repo.get_by_username(username).await?;
        let edges = self.follower_repo.find_following(user.id, limit).await?;

        let whom_ids: Vec<i64> = edges.iter().map(|edge| edge.whom_id).collect();
        let users = self.user_repo.find_by_ids(&whom_ids).await?;
        let by_id: HashMap<i64, user::Model> =
            users.into_iter().map(|user| (user.id, user)).collect();

        Ok(edges
            .iter()
            .filter_map(|edge| by_id.get(&edge.whom_id).cloned())
            .collect())
    }

    /// IDs of every user the given user follows.
    pub async fn following_ids(&self, who_id: i64) -> AppResult<Vec<i64>> {
        self.follower_repo.following_ids(who_id).await
    }

    /// Check whether the named user follows the given subject.
    ///
    /// An unregistered follower name reads as not following rather than
    /// erroring.
    pub async fn is_following(&self, whom_id: i64, who_username: &str) -> AppResult<bool> {
        let Some(who) = self.user_repo.find_by_username(who_username).await? else {
            return Ok(false);
        };

        self.follower_repo.exists(who.id, whom_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use minitwit_common::AppError;
    use minitwit_db::entities::follower;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: i64, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_edge(id: i64, who_id: i64, whom_id: i64) -> follower::Model {
        follower::Model {
            id,
            who_id,
            whom_id,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(
        follower_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> FollowService {
        FollowService::new(
            FollowerRepository::new(follower_db),
            UserRepository::new(user_db),
        )
    }

    #[tokio::test]
    async fn test_follow_creates_edge() {
        let alice = create_test_user(1, "alice");
        let bob = create_test_user(2, "bob");

        // Followee resolution and the insert both run on the follower store
        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .append_query_results([[create_test_edge(1, 1, 2)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 1,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice]])
                .into_connection(),
        );

        let service = create_test_service(follower_db, user_db);

        let result = service.follow("alice", "bob").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_follow_unknown_follower() {
        let follower_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(follower_db, user_db);

        let result = service.follow("ghost", "bob").await;
        match result {
            Err(AppError::UnknownUser(name)) => assert_eq!(name, "ghost"),
            _ => panic!("Expected UnknownUser error"),
        }
    }

    #[tokio::test]
    async fn test_follow_unknown_followee() {
        let alice = create_test_user(1, "alice");

        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice]])
                .into_connection(),
        );

        let service = create_test_service(follower_db, user_db);

        let result = service.follow("alice", "ghost").await;
        match result {
            Err(AppError::UnknownUser(name)) => assert_eq!(name, "ghost"),
            _ => panic!("Expected UnknownUser error"),
        }
    }

    #[tokio::test]
    async fn test_repeat_follow_stacks_edges() {
        let bob = create_test_user(2, "bob");

        // No existence probe runs between the two creates
        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob.clone()]])
                .append_query_results([[create_test_edge(1, 1, 2)]])
                .append_query_results([[bob]])
                .append_query_results([[create_test_edge(2, 1, 2)]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 1,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 2,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(follower_db, user_db);

        service.follow_as(1, "bob").await.unwrap();
        service.follow_as(1, "bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_self_follow_permitted() {
        let alice = create_test_user(1, "alice");

        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice]])
                .append_query_results([[create_test_edge(1, 1, 1)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 1,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(follower_db, user_db);

        let result = service.follow_as(1, "alice").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unfollow_removes_edge() {
        let alice = create_test_user(1, "alice");
        let bob = create_test_user(2, "bob");

        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .append_query_results([[alice]])
                .append_query_results([[create_test_edge(7, 1, 2)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(follower_db, user_db);

        let result = service.unfollow("bob", "alice").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unfollow_no_relation() {
        let alice = create_test_user(1, "alice");
        let bob = create_test_user(2, "bob");

        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .append_query_results([[alice]])
                .append_query_results([Vec::<follower::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(follower_db, user_db);

        let result = service.unfollow("bob", "alice").await;
        match result {
            Err(AppError::UnknownFollowerRelation { whom_id, who_id }) => {
                assert_eq!(whom_id, 2);
                assert_eq!(who_id, 1);
            }
            _ => panic!("Expected UnknownFollowerRelation error"),
        }
    }

    #[tokio::test]
    async fn test_unfollow_as_unknown_followee() {
        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(follower_db, user_db);

        let result = service.unfollow_as(1, "ghost").await;
        match result {
            Err(AppError::UnknownUser(name)) => assert_eq!(name, "ghost"),
            _ => panic!("Expected UnknownUser error"),
        }
    }

    #[tokio::test]
    async fn test_list_followers_preserves_edge_order() {
        let bob = create_test_user(2, "bob");
        let alice = create_test_user(1, "alice");
        let carol = create_test_user(3, "carol");

        // Newest edge first, with a duplicate edge from alice
        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_edge(9, 3, 2),
                    create_test_edge(5, 1, 2),
                    create_test_edge(4, 1, 2),
                ]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .append_query_results([[alice, carol]])
                .into_connection(),
        );

        let service = create_test_service(follower_db, user_db);

        let followers = service.list_followers("bob", 20).await.unwrap();
        let names: Vec<&str> = followers.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["carol", "alice", "alice"]);
    }

    #[tokio::test]
    async fn test_list_following() {
        let alice = create_test_user(1, "alice");
        let bob = create_test_user(2, "bob");
        let carol = create_test_user(3, "carol");

        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_edge(8, 1, 3), create_test_edge(2, 1, 2)]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice]])
                .append_query_results([[bob, carol]])
                .into_connection(),
        );

        let service = create_test_service(follower_db, user_db);

        let following = service.list_following("alice", 20).await.unwrap();
        let names: Vec<&str> = following.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["carol", "bob"]);
    }

    #[tokio::test]
    async fn test_is_following_true() {
        let alice = create_test_user(1, "alice");

        let follower_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_edge(1, 1, 2)]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice]])
                .into_connection(),
        );

        let service = create_test_service(follower_db, user_db);

        assert!(service.is_following(2, "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_following_unknown_user_reads_false() {
        let follower_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(follower_db, user_db);

        assert!(!service.is_following(2, "ghost").await.unwrap());
    }
}
