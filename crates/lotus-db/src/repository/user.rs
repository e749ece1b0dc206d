//! # User Repository
//!
//! Staff accounts. Token issuance happens elsewhere; this repository only
//! resolves cashier identity, so the stored password hash is write-only
//! here and never read back out.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lotus_core::{Role, User};

/// New user input. `password_hash` must already be hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

/// Cashier account create and lookup. Password hashes never leave the
/// INSERT; reads select around the column.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user and returns the stored record.
    ///
    /// Fails with `UniqueViolation` when the username is taken.
    pub async fn create(&self, input: &NewUser) -> DbResult<User> {
        let now = Utc::now();

        debug!(username = %input.username, role = ?input.role, "Creating user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, name, role, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
            "#,
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.name)
        .bind(input.role)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: input.username.clone(),
            name: input.name.clone(),
            role: input.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a user by ID, without the password hash.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, name, role, is_active, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(user)
    }

    /// Resolves a token subject to its user row.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, name, role, is_active, created_at, updated_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(user)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn user_input(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: "Test User".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db
            .users()
            .create(&user_input("reception", Role::Employee))
            .await
            .unwrap();

        let fetched = db.users().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "reception");
        assert_eq!(fetched.role, Role::Employee);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.users()
            .create(&user_input("admin", Role::Admin))
            .await
            .unwrap();

        let err = db
            .users()
            .create(&user_input("admin", Role::Admin))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.users()
            .create(&user_input("admin", Role::Admin))
            .await
            .unwrap();

        let found = db.users().find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.role, Role::Admin);
        assert!(db.users().find_by_username("ghost").await.unwrap().is_none());
    }
}
