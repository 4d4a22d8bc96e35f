//! User entity and repository.

use chrono::{DateTime, Utc};

use super::{parse_datetime, DbPool};
use crate::error::{FeedloopError, Result};

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    /// User ID.
    pub id: i64,
    /// Unique user name.
    pub name: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Row type for users from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    created_at: String,
    updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user. Names are unique.
    pub async fn create(&self, name: &str) -> Result<User> {
        let now = Utc::now().to_rfc3339();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, created_at, updated_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FeedloopError::NotFound("user".into()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(row.map(User::from))
    }

    /// Get a user by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(row.map(User::from))
    }

    /// List all users in registration order.
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users ORDER BY id ASC",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Delete all users. Feeds, follows and posts cascade.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users")
            .execute(self.pool)
            .await
            .map_err(|e| FeedloopError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create("alice").await.unwrap();
        assert!(user.id > 0);
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create("alice").await.unwrap();
        let result = repo.create("alice").await;
        assert!(matches!(result, Err(FeedloopError::Database(_))));
    }

    #[tokio::test]
    async fn test_get_by_name() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create("alice").await.unwrap();
        let user = repo.get_by_name("alice").await.unwrap().unwrap();
        assert_eq!(user.name, "alice");

        assert!(repo.get_by_name("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create("alice").await.unwrap();
        repo.create("bob").await.unwrap();

        let users = repo.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "alice");
        assert_eq!(users[1].name, "bob");
    }

    #[tokio::test]
    async fn test_delete_all() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create("alice").await.unwrap();
        repo.create("bob").await.unwrap();

        let deleted = repo.delete_all().await.unwrap();
        assert_eq!(deleted, 2);
        assert!(repo.list().await.unwrap().is_empty());
    }
}
