use crate::db::{now_timestamp, uuid_column, SharedConnection, StoreError, StoreResult};
use crate::models::{AuthorSummary, Like, LikeView};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

const LIKE_COLUMNS: &str = "id, post_id, user_id, created_at, updated_at";

pub struct LikeStore {
    conn: SharedConnection,
}

impl LikeStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_like(row: &Row<'_>) -> rusqlite::Result<Like> {
        Ok(Like {
            id: uuid_column(row, 0)?,
            blog_post: uuid_column(row, 1)?,
            user: uuid_column(row, 2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    /// Record a like. The (post, user) pair is unique in the schema, so a
    /// concurrent duplicate fails with `Conflict` instead of a second row.
    pub fn create(&self, post_id: Uuid, user_id: Uuid) -> StoreResult<Like> {
        let now = now_timestamp();
        let like = Like {
            id: Uuid::new_v4(),
            blog_post: post_id,
            user: user_id,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO likes (id, post_id, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                like.id.to_string(),
                like.blog_post.to_string(),
                like.user.to_string(),
                like.created_at,
                like.updated_at,
            ],
        )
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict("You have already liked this post".to_string())
            }
            other => other,
        })?;

        Ok(like)
    }

    pub fn find_by_id(&self, like_id: &Uuid) -> StoreResult<Option<Like>> {
        let conn = self.conn.lock();
        let like = conn
            .query_row(
                &format!("SELECT {LIKE_COLUMNS} FROM likes WHERE id = ?1"),
                params![like_id.to_string()],
                Self::row_to_like,
            )
            .optional()?;
        Ok(like)
    }

    pub fn find_for_user(&self, post_id: &Uuid, user_id: &Uuid) -> StoreResult<Option<Like>> {
        let conn = self.conn.lock();
        let like = conn
            .query_row(
                &format!("SELECT {LIKE_COLUMNS} FROM likes WHERE post_id = ?1 AND user_id = ?2"),
                params![post_id.to_string(), user_id.to_string()],
                Self::row_to_like,
            )
            .optional()?;
        Ok(like)
    }

    pub fn list_for_post(&self, post_id: &Uuid) -> StoreResult<Vec<LikeView>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT l.id, l.post_id, l.user_id, l.created_at, l.updated_at, u.name, u.email
             FROM likes l JOIN users u ON u.id = l.user_id
             WHERE l.post_id = ?1
             ORDER BY l.created_at ASC, l.rowid ASC",
        )?;

        let likes = stmt
            .query_map(params![post_id.to_string()], |row| {
                let like = Self::row_to_like(row)?;
                Ok(LikeView {
                    id: like.id,
                    blog_post: like.blog_post,
                    user: AuthorSummary {
                        id: like.user,
                        name: row.get(5)?,
                        email: row.get(6)?,
                    },
                    created_at: like.created_at,
                    updated_at: like.updated_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(likes)
    }

    pub fn delete(&self, like_id: &Uuid) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM likes WHERE id = ?1", params![like_id.to_string()])?;
        Ok(deleted > 0)
    }
}
