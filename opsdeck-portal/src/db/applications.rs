//! Application registry operations
//!
//! Applications belong to an owner and may point at a dev and a prod server.
//! The last_updated stamp is written by the store, not the caller.

use opsdeck_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Registered application record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub owner_badge: i64,
    pub dev_server_id: Option<i64>,
    pub prod_server_id: Option<i64>,
    pub app_name: String,
    pub app_description: Option<String>,
    pub status: Option<String>,
    pub dev_domain: Option<String>,
    pub last_updated: Option<String>,
    pub last_updated_by: Option<String>,
}

/// Fields for a new application
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub owner_badge: i64,
    pub dev_server_id: Option<i64>,
    pub prod_server_id: Option<i64>,
    pub app_name: String,
    pub app_description: Option<String>,
    pub status: Option<String>,
    pub dev_domain: Option<String>,
    pub last_updated_by: Option<String>,
}

/// Optional fields for an application update; absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub dev_server_id: Option<i64>,
    pub prod_server_id: Option<i64>,
    pub app_name: Option<String>,
    pub app_description: Option<String>,
    pub status: Option<String>,
    pub dev_domain: Option<String>,
    pub last_updated_by: Option<String>,
}

pub async fn list_applications(pool: &SqlitePool) -> Result<Vec<Application>> {
    let apps = sqlx::query_as::<_, Application>(
        r#"
        SELECT id, owner_badge, dev_server_id, prod_server_id, app_name,
               app_description, status, dev_domain, last_updated, last_updated_by
        FROM applications
        ORDER BY app_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(apps)
}

pub async fn find_application(pool: &SqlitePool, id: i64) -> Result<Option<Application>> {
    let app = sqlx::query_as::<_, Application>(
        r#"
        SELECT id, owner_badge, dev_server_id, prod_server_id, app_name,
               app_description, status, dev_domain, last_updated, last_updated_by
        FROM applications
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(app)
}

pub async fn insert_application(pool: &SqlitePool, app: &NewApplication) -> Result<Application> {
    let inserted = sqlx::query_as::<_, Application>(
        r#"
        INSERT INTO applications (
            owner_badge, dev_server_id, prod_server_id, app_name,
            app_description, status, dev_domain, last_updated, last_updated_by
        ) VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'), ?)
        RETURNING id, owner_badge, dev_server_id, prod_server_id, app_name,
                  app_description, status, dev_domain, last_updated, last_updated_by
        "#,
    )
    .bind(app.owner_badge)
    .bind(app.dev_server_id)
    .bind(app.prod_server_id)
    .bind(&app.app_name)
    .bind(&app.app_description)
    .bind(&app.status)
    .bind(&app.dev_domain)
    .bind(&app.last_updated_by)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

pub async fn update_application(
    pool: &SqlitePool,
    id: i64,
    patch: &ApplicationPatch,
) -> Result<Option<Application>> {
    let updated = sqlx::query_as::<_, Application>(
        r#"
        UPDATE applications SET
            dev_server_id = COALESCE(?, dev_server_id),
            prod_server_id = COALESCE(?, prod_server_id),
            app_name = COALESCE(?, app_name),
            app_description = COALESCE(?, app_description),
            status = COALESCE(?, status),
            dev_domain = COALESCE(?, dev_domain),
            last_updated = datetime('now'),
            last_updated_by = COALESCE(?, last_updated_by)
        WHERE id = ?
        RETURNING id, owner_badge, dev_server_id, prod_server_id, app_name,
                  app_description, status, dev_domain, last_updated, last_updated_by
        "#,
    )
    .bind(patch.dev_server_id)
    .bind(patch.prod_server_id)
    .bind(&patch.app_name)
    .bind(&patch.app_description)
    .bind(&patch.status)
    .bind(&patch.dev_domain)
    .bind(&patch.last_updated_by)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::test_user;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        crate::db::users::insert_user(&pool, &test_user(96880)).await.unwrap();
        pool
    }

    fn sample() -> NewApplication {
        NewApplication {
            owner_badge: 96880,
            dev_server_id: None,
            prod_server_id: None,
            app_name: "timekeeper".to_string(),
            app_description: None,
            status: Some("live".to_string()),
            dev_domain: None,
            last_updated_by: Some("tut".to_string()),
        }
    }

    #[tokio::test]
    async fn insert_stamps_last_updated() {
        let pool = test_pool().await;

        let app = insert_application(&pool, &sample()).await.unwrap();
        assert!(app.last_updated.is_some());
        assert_eq!(app.app_name, "timekeeper");
    }

    #[tokio::test]
    async fn patch_leaves_absent_fields() {
        let pool = test_pool().await;
        let app = insert_application(&pool, &sample()).await.unwrap();

        let patch = ApplicationPatch {
            status: Some("retired".to_string()),
            ..Default::default()
        };
        let updated = update_application(&pool, app.id, &patch).await.unwrap().unwrap();

        assert_eq!(updated.status.as_deref(), Some("retired"));
        assert_eq!(updated.app_name, "timekeeper");
        assert!(update_application(&pool, 999, &patch).await.unwrap().is_none());
    }
}
