//! Blog post storage

use crate::db::{now_timestamp, uuid_column, SharedConnection, StoreResult};
use crate::models::{AuthorSummary, BlogPost, BlogPostView, Category, NewPost, PostChanges, PostStatus};
use anyhow::Context;
use rusqlite::{params, types::Type, OptionalExtension, Row};
use uuid::Uuid;

const POST_COLUMNS: &str =
    "p.id, p.title, p.content, p.author_id, p.category, p.tags, p.status, p.views, p.created_at, p.updated_at";

/// Listing filters for `PostStore::list`
#[derive(Debug, Clone)]
pub enum PostFilter {
    All,
    Author(Uuid),
    Category(Category),
    Status(PostStatus),
    /// Case-insensitive substring match on title or content
    Search(String),
}

pub struct PostStore {
    conn: SharedConnection,
}

fn tags_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Unicode-aware case-insensitive substring match on title or content.
fn matches_search(post: &BlogPostView, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle) || post.content.to_lowercase().contains(needle)
}

impl PostStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_post(row: &Row<'_>) -> rusqlite::Result<BlogPost> {
        Ok(BlogPost {
            id: uuid_column(row, 0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            author: uuid_column(row, 3)?,
            category: row.get(4)?,
            tags: tags_column(row, 5)?,
            status: row.get(6)?,
            views: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn row_to_view(row: &Row<'_>) -> rusqlite::Result<BlogPostView> {
        let post = Self::row_to_post(row)?;
        Ok(BlogPostView {
            id: post.id,
            title: post.title,
            content: post.content,
            author: AuthorSummary {
                id: post.author,
                name: row.get(10)?,
                email: row.get(11)?,
            },
            category: post.category,
            tags: post.tags,
            status: post.status,
            views: post.views,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }

    pub fn create(&self, author: Uuid, new_post: NewPost) -> StoreResult<BlogPost> {
        let now = now_timestamp();
        let post = BlogPost {
            id: Uuid::new_v4(),
            title: new_post.title,
            content: new_post.content,
            author,
            category: new_post.category,
            tags: new_post.tags,
            status: PostStatus::Pending,
            views: 0,
            created_at: now.clone(),
            updated_at: now,
        };
        let tags = serde_json::to_string(&post.tags).context("Failed to encode tags")?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO blog_posts (id, title, content, author_id, category, tags, status, views, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                post.id.to_string(),
                post.title,
                post.content,
                post.author.to_string(),
                post.category,
                tags,
                post.status,
                post.views,
                post.created_at,
                post.updated_at,
            ],
        )?;

        Ok(post)
    }

    /// Load a post for an ownership check
    pub fn find_by_id(&self, post_id: &Uuid) -> StoreResult<Option<BlogPost>> {
        let conn = self.conn.lock();
        let post = conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM blog_posts p WHERE p.id = ?1"),
                params![post_id.to_string()],
                Self::row_to_post,
            )
            .optional()?;
        Ok(post)
    }

    /// Load a post with its author populated
    pub fn find_view(&self, post_id: &Uuid) -> StoreResult<Option<BlogPostView>> {
        let conn = self.conn.lock();
        let view = conn
            .query_row(
                &format!(
                    "SELECT {POST_COLUMNS}, u.name, u.email
                     FROM blog_posts p JOIN users u ON u.id = p.author_id
                     WHERE p.id = ?1"
                ),
                params![post_id.to_string()],
                Self::row_to_view,
            )
            .optional()?;
        Ok(view)
    }

    /// Count one view and return the post. `None` if it does not exist.
    pub fn record_view(&self, post_id: &Uuid) -> StoreResult<Option<BlogPostView>> {
        let updated = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE blog_posts SET views = views + 1 WHERE id = ?1",
                params![post_id.to_string()],
            )?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.find_view(post_id)
    }

    pub fn list(&self, filter: &PostFilter) -> StoreResult<Vec<BlogPostView>> {
        let (clause, arg) = match filter {
            PostFilter::All => ("", None),
            PostFilter::Author(author) => ("WHERE p.author_id = ?1", Some(author.to_string())),
            PostFilter::Category(category) => {
                ("WHERE p.category = ?1", Some(category.as_str().to_string()))
            }
            PostFilter::Status(status) => ("WHERE p.status = ?1", Some(status.as_str().to_string())),
            // SQLite LIKE only folds ASCII case, so matching happens below
            PostFilter::Search(_) => ("", None),
        };

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS}, u.name, u.email
             FROM blog_posts p JOIN users u ON u.id = p.author_id
             {clause}
             ORDER BY p.created_at DESC, p.rowid DESC"
        ))?;

        let rows = match &arg {
            Some(value) => stmt.query_map(params![value], Self::row_to_view)?,
            None => stmt.query_map([], Self::row_to_view)?,
        };
        let mut posts = rows.collect::<Result<Vec<_>, _>>()?;

        if let PostFilter::Search(query) = filter {
            let needle = query.to_lowercase();
            posts.retain(|post| matches_search(post, &needle));
        }

        Ok(posts)
    }

    /// Apply a partial update in one statement. `None` if the post is gone.
    pub fn update(&self, post_id: &Uuid, changes: PostChanges) -> StoreResult<Option<BlogPost>> {
        let tags = changes
            .tags
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to encode tags")?;

        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE blog_posts SET
                title = COALESCE(?2, title),
                content = COALESCE(?3, content),
                category = COALESCE(?4, category),
                tags = COALESCE(?5, tags),
                updated_at = ?6
             WHERE id = ?1",
            params![
                post_id.to_string(),
                changes.title,
                changes.content,
                changes.category,
                tags,
                now_timestamp(),
            ],
        )?;

        if updated == 0 {
            return Ok(None);
        }

        let post = conn.query_row(
            &format!("SELECT {POST_COLUMNS} FROM blog_posts p WHERE p.id = ?1"),
            params![post_id.to_string()],
            Self::row_to_post,
        )?;
        Ok(Some(post))
    }

    pub fn set_status(&self, post_id: &Uuid, status: PostStatus) -> StoreResult<Option<BlogPost>> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE blog_posts SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![post_id.to_string(), status, now_timestamp()],
        )?;

        if updated == 0 {
            return Ok(None);
        }

        let post = conn.query_row(
            &format!("SELECT {POST_COLUMNS} FROM blog_posts p WHERE p.id = ?1"),
            params![post_id.to_string()],
            Self::row_to_post,
        )?;
        Ok(Some(post))
    }

    /// Delete a post; its comments and likes cascade. Returns whether a row was removed.
    pub fn delete(&self, post_id: &Uuid) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM blog_posts WHERE id = ?1",
            params![post_id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}
