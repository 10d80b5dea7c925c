//! Database entities.

pub mod follower;
pub mod message;
pub mod user;

pub use follower::Entity as Follower;
pub use message::Entity as Message;
pub use user::Entity as User;
