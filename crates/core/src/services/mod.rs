//! Business logic services.

#![allow(missing_docs)]

pub mod follow;
pub mod timeline;
pub mod user;

pub use follow::FollowService;
pub use timeline::{CreateMessageInput, FeedEntry, TimelineService};
pub use user::{CreateUserInput, UserService};
