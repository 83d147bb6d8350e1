//! Server inventory operations

use opsdeck_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Inventory record for a managed server
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Server {
    pub id: i64,
    pub hostname: String,
    pub ip_address: String,
    pub os: String,
    pub status: String,
    pub environment: String,
    pub role: String,
    pub location: String,
    pub folder: Option<String>,
}

/// Fields for a new server
#[derive(Debug, Clone)]
pub struct NewServer {
    pub hostname: String,
    pub ip_address: String,
    pub os: String,
    pub status: String,
    pub environment: String,
    pub role: String,
    pub location: String,
    pub folder: Option<String>,
}

/// List servers, optionally filtered by a substring over hostname,
/// ip_address, and role.
pub async fn list_servers(pool: &SqlitePool, query: Option<&str>) -> Result<Vec<Server>> {
    let servers = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            let pattern = format!("%{}%", q);
            sqlx::query_as::<_, Server>(
                r#"
                SELECT id, hostname, ip_address, os, status, environment, role, location, folder
                FROM servers
                WHERE hostname LIKE ?1 OR ip_address LIKE ?1 OR role LIKE ?1
                ORDER BY hostname
                "#,
            )
            .bind(pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Server>(
                r#"
                SELECT id, hostname, ip_address, os, status, environment, role, location, folder
                FROM servers
                ORDER BY hostname
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(servers)
}

/// Load server by id
pub async fn find_server(pool: &SqlitePool, id: i64) -> Result<Option<Server>> {
    let server = sqlx::query_as::<_, Server>(
        r#"
        SELECT id, hostname, ip_address, os, status, environment, role, location, folder
        FROM servers
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(server)
}

/// Insert a new server
pub async fn insert_server(pool: &SqlitePool, server: &NewServer) -> Result<Server> {
    let inserted = sqlx::query_as::<_, Server>(
        r#"
        INSERT INTO servers (hostname, ip_address, os, status, environment, role, location, folder)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, hostname, ip_address, os, status, environment, role, location, folder
        "#,
    )
    .bind(&server.hostname)
    .bind(&server.ip_address)
    .bind(&server.os)
    .bind(&server.status)
    .bind(&server.environment)
    .bind(&server.role)
    .bind(&server.location)
    .bind(&server.folder)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

#[cfg(test)]
pub(crate) fn test_server(hostname: &str, role: &str) -> NewServer {
    NewServer {
        hostname: hostname.to_string(),
        ip_address: "10.0.0.1".to_string(),
        os: "RHEL 9".to_string(),
        status: "online".to_string(),
        environment: "dev".to_string(),
        role: role.to_string(),
        location: "HQ".to_string(),
        folder: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn list_filters_by_substring() {
        let pool = test_pool().await;

        insert_server(&pool, &test_server("web-01", "app")).await.unwrap();
        insert_server(&pool, &test_server("db-01", "database")).await.unwrap();

        let all = list_servers(&pool, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let web = list_servers(&pool, Some("web")).await.unwrap();
        assert_eq!(web.len(), 1);
        assert_eq!(web[0].hostname, "web-01");

        // Role matches too
        let dbs = list_servers(&pool, Some("database")).await.unwrap();
        assert_eq!(dbs.len(), 1);

        // Blank filter means no filter
        let blank = list_servers(&pool, Some("  ")).await.unwrap();
        assert_eq!(blank.len(), 2);
    }
}
