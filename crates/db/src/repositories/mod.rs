//! Database repositories.

pub mod follower;
pub mod message;
pub mod user;

pub use follower::FollowerRepository;
pub use message::MessageRepository;
pub use user::UserRepository;
