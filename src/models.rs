use crate::auth::policy::Owned;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Blog categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Technology,
    Health,
    Lifestyle,
    Education,
    Business,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Technology,
        Category::Health,
        Category::Lifestyle,
        Category::Education,
        Category::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Health => "Health",
            Category::Lifestyle => "Lifestyle",
            Category::Education => "Education",
            Category::Business => "Business",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Moderation status of a post
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Approved,
    Rejected,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Pending => "pending",
            PostStatus::Approved => "approved",
            PostStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PostStatus::Pending),
            "approved" => Ok(PostStatus::Approved),
            "rejected" => Ok(PostStatus::Rejected),
            other => Err(format!("Unknown post status: {}", other)),
        }
    }
}

macro_rules! text_enum_sql {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

text_enum_sql!(Category);
text_enum_sql!(PostStatus);

/// Public projection of a user embedded in listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A blog post as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Uuid,
    pub category: Category,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Owned for BlogPost {
    fn owner_id(&self) -> Uuid {
        self.author
    }
}

/// A blog post with its author populated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorSummary,
    pub category: Category,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
}

/// Partial post update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub blog_post: Uuid,
    pub author: Uuid,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub blog_post: Uuid,
    pub author: AuthorSummary,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub blog_post: Uuid,
    pub user: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl Owned for Like {
    fn owner_id(&self) -> Uuid {
        self.user
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeView {
    pub id: Uuid,
    pub blog_post: Uuid,
    pub user: AuthorSummary,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user: Uuid,
    pub message: String,
    pub read: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Owned for Notification {
    fn owner_id(&self) -> Uuid {
        self.user
    }
}

// Request bodies. Every field is optional so a missing one becomes a 400
// with a readable message instead of a deserialization failure.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub blog_post: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateLikeRequest {
    pub blog_post: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateNotificationRequest {
    pub user: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub query: Option<String>,
}
