//! User Storage
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::User;
use crate::db::{now_timestamp, uuid_column, SharedConnection, StoreError, StoreResult};
use anyhow::Context;
use bcrypt::{hash, verify};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{info, warn};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin, created_at, updated_at";

/// Field changes applied by profile and admin edits. `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// User storage with SQLite backend
pub struct UserStore {
    conn: SharedConnection,
    bcrypt_cost: u32,
}

impl UserStore {
    pub fn new(conn: SharedConnection, bcrypt_cost: u32) -> Self {
        Self { conn, bcrypt_cost }
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: uuid_column(row, 0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            is_admin: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn hash_password(&self, password: &str) -> StoreResult<String> {
        Ok(hash(password, self.bcrypt_cost).context("Failed to hash password")?)
    }

    /// Create the default admin account on a fresh install (empty user table)
    pub fn ensure_default_admin(&self, email: &str, password: &str) -> StoreResult<Option<User>> {
        let count: i64 = {
            let conn = self.conn.lock();
            conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
                .context("Failed to count users")?
        };

        if count > 0 {
            return Ok(None);
        }

        let admin = self.create_user("Admin", email, password, true)?;
        info!("🔐 Default admin user created (email: {})", email);
        warn!("⚠️  CHANGE DEFAULT ADMIN PASSWORD IN PRODUCTION!");
        Ok(Some(admin))
    }

    /// Get user by id
    pub fn find_by_id(&self, user_id: &Uuid) -> StoreResult<Option<User>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id.to_string()],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email.trim()],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Verify email and password, returning the account on success
    pub fn verify_credentials(&self, email: &str, password: &str) -> StoreResult<Option<User>> {
        let Some(user) = self.find_by_email(email)? else {
            return Ok(None);
        };

        let valid = verify(password, &user.password_hash).context("Failed to verify password")?;
        Ok(valid.then_some(user))
    }

    /// Create a new user. A taken email is a `Conflict`.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> StoreResult<User> {
        let password_hash = self.hash_password(password)?;
        let now = now_timestamp();

        let user = User {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password_hash,
            is_admin,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.is_admin,
                user.created_at,
                user.updated_at,
            ],
        )
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => StoreError::Conflict("User already exists".to_string()),
            other => other,
        })?;

        info!(
            "✅ Created user: {} ({})",
            user.email,
            if user.is_admin { "admin" } else { "user" }
        );

        Ok(user)
    }

    /// Apply field changes in one UPDATE and return the stored result
    pub fn update_user(&self, user_id: &Uuid, changes: UserChanges) -> StoreResult<User> {
        let password_hash = match changes.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        let conn = self.conn.lock();
        let rows_affected = conn
            .execute(
                "UPDATE users SET
                    name = COALESCE(?2, name),
                    email = COALESCE(?3, email),
                    password_hash = COALESCE(?4, password_hash),
                    is_admin = COALESCE(?5, is_admin),
                    updated_at = ?6
                 WHERE id = ?1",
                params![
                    user_id.to_string(),
                    changes.name.as_deref().map(str::trim),
                    changes.email.as_deref().map(str::trim),
                    password_hash,
                    changes.is_admin,
                    now_timestamp(),
                ],
            )
            .map_err(|e| match StoreError::from(e) {
                StoreError::Conflict(_) => StoreError::Conflict("Email already in use".to_string()),
                other => other,
            })?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        let user = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![user_id.to_string()],
            Self::row_to_user,
        )?;
        Ok(user)
    }

    /// List all users (admin only)
    pub fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid"
        ))?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Delete a user by ID (admin only). Their content goes with them.
    pub fn delete_user(&self, user_id: &Uuid) -> StoreResult<()> {
        let conn = self.conn.lock();

        let rows_affected = conn.execute(
            "DELETE FROM users WHERE id = ?1",
            params![user_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        info!("🗑️  Deleted user: {}", user_id);
        Ok(())
    }
}
