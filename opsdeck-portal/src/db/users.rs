//! User directory operations
//!
//! Users are keyed by their externally-assigned badge number. They are never
//! auto-created by other subsystems because the name fields are required and
//! cannot be defaulted.

use opsdeck_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::conflict_on_unique;

/// Portal user record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub badge: i64,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<i64>,
    pub read_only: i64,
}

/// Optional fields for a user update; absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<i64>,
    pub read_only: Option<i64>,
}

/// List all users ordered by badge
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT badge, email, first_name, last_name, position, read_only
        FROM users
        ORDER BY badge
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Load user by badge
pub async fn find_user(pool: &SqlitePool, badge: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT badge, email, first_name, last_name, position, read_only
        FROM users
        WHERE badge = ?
        "#,
    )
    .bind(badge)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Insert a new user; a duplicate badge surfaces as a conflict.
pub async fn insert_user(pool: &SqlitePool, user: &User) -> Result<User> {
    let inserted = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (badge, email, first_name, last_name, position, read_only)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING badge, email, first_name, last_name, position, read_only
        "#,
    )
    .bind(user.badge)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.position)
    .bind(user.read_only)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, &format!("User with badge {} already exists", user.badge)))?;

    Ok(inserted)
}

/// Merge supplied fields into an existing user. Returns None if the badge
/// does not resolve.
pub async fn update_user(pool: &SqlitePool, badge: i64, patch: &UserPatch) -> Result<Option<User>> {
    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            email = COALESCE(?, email),
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            position = COALESCE(?, position),
            read_only = COALESCE(?, read_only)
        WHERE badge = ?
        RETURNING badge, email, first_name, last_name, position, read_only
        "#,
    )
    .bind(&patch.email)
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(patch.position)
    .bind(patch.read_only)
    .bind(badge)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

/// Delete user by badge. Returns false if nothing was deleted.
pub async fn delete_user(pool: &SqlitePool, badge: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE badge = ?")
        .bind(badge)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
pub(crate) fn test_user(badge: i64) -> User {
    User {
        badge,
        email: Some(format!("user{}@example.net", badge)),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        position: None,
        read_only: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdeck_common::Error;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn insert_and_find_user() {
        let pool = test_pool().await;

        insert_user(&pool, &test_user(96880)).await.unwrap();

        let loaded = find_user(&pool, 96880).await.unwrap().unwrap();
        assert_eq!(loaded.badge, 96880);
        assert_eq!(loaded.first_name, "Test");
        assert!(find_user(&pool, 11111).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_badge_is_conflict() {
        let pool = test_pool().await;

        insert_user(&pool, &test_user(96880)).await.unwrap();
        let err = insert_user(&pool, &test_user(96880)).await.unwrap_err();

        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn patch_merges_fields() {
        let pool = test_pool().await;
        insert_user(&pool, &test_user(96880)).await.unwrap();

        let patch = UserPatch {
            first_name: Some("Trung".to_string()),
            ..Default::default()
        };
        let updated = update_user(&pool, 96880, &patch).await.unwrap().unwrap();

        assert_eq!(updated.first_name, "Trung");
        // Untouched fields survive
        assert_eq!(updated.last_name, "User");

        assert!(update_user(&pool, 11111, &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_missing_row() {
        let pool = test_pool().await;
        insert_user(&pool, &test_user(96880)).await.unwrap();

        assert!(delete_user(&pool, 96880).await.unwrap());
        assert!(!delete_user(&pool, 96880).await.unwrap());
    }
}
