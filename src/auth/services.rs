use sqlx::SqlitePool;
use tracing::info;

use super::models::User;
use crate::common::{generate_user_id, safe_email_log};

pub struct UsersService {
    db: SqlitePool,
}

impl UsersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    /// Return the user with this email, creating it on first sight.
    ///
    /// Keyed on email only: the same address from any provider resolves to
    /// the same user. A concurrent insert of the same email is absorbed by
    /// the unique constraint and the winner's row is returned.
    pub async fn find_or_create_by_email(&self, email: &str) -> Result<User, sqlx::Error> {
        if let Some(user) = self.find_by_email(email).await? {
            return Ok(user);
        }

        let id = generate_user_id();
        let inserted = sqlx::query("INSERT INTO users (id, email) VALUES (?, ?) ON CONFLICT(email) DO NOTHING")
            .bind(&id)
            .bind(email)
            .execute(&self.db)
            .await?;

        if inserted.rows_affected() > 0 {
            info!(user_id = %id, email = %safe_email_log(email), "Created new user");
        }

        self.find_by_email(email)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }
}
