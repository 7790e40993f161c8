use crate::db::{now_timestamp, uuid_column, SharedConnection, StoreResult};
use crate::models::Notification;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, read, created_at, updated_at";

pub struct NotificationStore {
    conn: SharedConnection,
}

impl NotificationStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
        Ok(Notification {
            id: uuid_column(row, 0)?,
            user: uuid_column(row, 1)?,
            message: row.get(2)?,
            read: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    pub fn create(&self, user_id: Uuid, message: &str) -> StoreResult<Notification> {
        let now = now_timestamp();
        let notification = Notification {
            id: Uuid::new_v4(),
            user: user_id,
            message: message.to_string(),
            read: false,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO notifications (id, user_id, message, read, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                notification.id.to_string(),
                notification.user.to_string(),
                notification.message,
                notification.read,
                notification.created_at,
                notification.updated_at,
            ],
        )?;

        Ok(notification)
    }

    pub fn find_by_id(&self, notification_id: &Uuid) -> StoreResult<Option<Notification>> {
        let conn = self.conn.lock();
        let notification = conn
            .query_row(
                &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
                params![notification_id.to_string()],
                Self::row_to_notification,
            )
            .optional()?;
        Ok(notification)
    }

    /// Newest first. With `unread_only`, read notifications are skipped.
    pub fn list_for_user(&self, user_id: &Uuid, unread_only: bool) -> StoreResult<Vec<Notification>> {
        let conn = self.conn.lock();
        let sql = if unread_only {
            format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE user_id = ?1 AND read = 0
                 ORDER BY created_at DESC, rowid DESC"
            )
        } else {
            format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            )
        };

        let mut stmt = conn.prepare(&sql)?;
        let notifications = stmt
            .query_map(params![user_id.to_string()], Self::row_to_notification)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    pub fn mark_read(&self, notification_id: &Uuid) -> StoreResult<Option<Notification>> {
        let updated = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE notifications SET read = 1, updated_at = ?2 WHERE id = ?1",
                params![notification_id.to_string(), now_timestamp()],
            )?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.find_by_id(notification_id)
    }

    pub fn delete(&self, notification_id: &Uuid) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM notifications WHERE id = ?1",
            params![notification_id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}
