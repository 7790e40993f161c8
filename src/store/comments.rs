use crate::db::{now_timestamp, uuid_column, SharedConnection, StoreResult};
use crate::models::{AuthorSummary, Comment, CommentView};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

pub struct CommentStore {
    conn: SharedConnection,
}

impl CommentStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
        Ok(Comment {
            id: uuid_column(row, 0)?,
            blog_post: uuid_column(row, 1)?,
            author: uuid_column(row, 2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    /// Insert a comment. A vanished post surfaces as `StoreError::NotFound`.
    pub fn create(&self, post_id: Uuid, author: Uuid, content: &str) -> StoreResult<Comment> {
        let now = now_timestamp();
        let comment = Comment {
            id: Uuid::new_v4(),
            blog_post: post_id,
            author,
            content: content.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO comments (id, post_id, author_id, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                comment.id.to_string(),
                comment.blog_post.to_string(),
                comment.author.to_string(),
                comment.content,
                comment.created_at,
                comment.updated_at,
            ],
        )?;

        Ok(comment)
    }

    pub fn find_by_id(&self, comment_id: &Uuid) -> StoreResult<Option<Comment>> {
        let conn = self.conn.lock();
        let comment = conn
            .query_row(
                "SELECT id, post_id, author_id, content, created_at, updated_at
                 FROM comments WHERE id = ?1",
                params![comment_id.to_string()],
                Self::row_to_comment,
            )
            .optional()?;
        Ok(comment)
    }

    /// Comments on a post, oldest first, with authors populated
    pub fn list_for_post(&self, post_id: &Uuid) -> StoreResult<Vec<CommentView>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, c.updated_at, u.name, u.email
             FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.post_id = ?1
             ORDER BY c.created_at ASC, c.rowid ASC",
        )?;

        let comments = stmt
            .query_map(params![post_id.to_string()], |row| {
                let comment = Self::row_to_comment(row)?;
                Ok(CommentView {
                    id: comment.id,
                    blog_post: comment.blog_post,
                    author: AuthorSummary {
                        id: comment.author,
                        name: row.get(6)?,
                        email: row.get(7)?,
                    },
                    content: comment.content,
                    created_at: comment.created_at,
                    updated_at: comment.updated_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    pub fn update_content(&self, comment_id: &Uuid, content: &str) -> StoreResult<Option<Comment>> {
        let updated = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE comments SET content = ?2, updated_at = ?3 WHERE id = ?1",
                params![comment_id.to_string(), content, now_timestamp()],
            )?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.find_by_id(comment_id)
    }

    pub fn delete(&self, comment_id: &Uuid) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM comments WHERE id = ?1",
            params![comment_id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}
