//! Content Storage
//! Mission: SQLite-backed posts, comments, likes and notifications

pub mod comments;
pub mod likes;
pub mod notifications;
pub mod posts;

pub use comments::CommentStore;
pub use likes::LikeStore;
pub use notifications::NotificationStore;
pub use posts::{PostFilter, PostStore};
