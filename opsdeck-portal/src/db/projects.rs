//! Project catalog operations

use opsdeck_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Team project record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub github_url: String,
}

/// Fields for a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: String,
    pub github_url: String,
}

/// Optional fields for a project update; absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub github_url: Option<String>,
}

pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT id, name, description, status, github_url FROM projects ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(projects)
}

pub async fn find_project(pool: &SqlitePool, id: i64) -> Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>(
        "SELECT id, name, description, status, github_url FROM projects WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(project)
}

pub async fn insert_project(pool: &SqlitePool, project: &NewProject) -> Result<Project> {
    let inserted = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (name, description, status, github_url)
        VALUES (?, ?, ?, ?)
        RETURNING id, name, description, status, github_url
        "#,
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.status)
    .bind(&project.github_url)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

pub async fn update_project(
    pool: &SqlitePool,
    id: i64,
    patch: &ProjectPatch,
) -> Result<Option<Project>> {
    let updated = sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            status = COALESCE(?, status),
            github_url = COALESCE(?, github_url)
        WHERE id = ?
        RETURNING id, name, description, status, github_url
        "#,
    )
    .bind(&patch.name)
    .bind(&patch.description)
    .bind(&patch.status)
    .bind(&patch.github_url)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

pub async fn delete_project(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    fn sample() -> NewProject {
        NewProject {
            name: "fare-ingest".to_string(),
            description: "Nightly fare data ingest".to_string(),
            status: "active".to_string(),
            github_url: "https://github.com/example/fare-ingest".to_string(),
        }
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let pool = test_pool().await;

        let created = insert_project(&pool, &sample()).await.unwrap();
        assert_eq!(find_project(&pool, created.id).await.unwrap().unwrap().name, "fare-ingest");

        let patch = ProjectPatch {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        let updated = update_project(&pool, created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.status, "archived");
        assert_eq!(updated.name, "fare-ingest");

        assert!(delete_project(&pool, created.id).await.unwrap());
        assert!(find_project(&pool, created.id).await.unwrap().is_none());
    }
}
