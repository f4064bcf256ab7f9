//! Directory repository
//!
//! Categories and audience levels.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, Level};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// All categories ordered by id
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// All levels ordered by id
    async fn list_levels(&self) -> Result<Vec<Level>>;

    async fn create_category(&self, name: &str) -> Result<Category>;

    async fn create_level(&self, name: &str) -> Result<Level>;
}

/// SQLx-based directory repository for SQLite and MySQL
pub struct SqlxDirectoryRepository {
    pool: DynDatabasePool,
}

impl SqlxDirectoryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn DirectoryRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Directory tables share the `{id, name}` shape
#[derive(Clone, Copy)]
enum Table {
    Categories,
    Levels,
}

impl Table {
    fn name(&self) -> &'static str {
        match self {
            Table::Categories => "categories",
            Table::Levels => "levels",
        }
    }
}

impl SqlxDirectoryRepository {
    async fn list(&self, table: Table) -> Result<Vec<(i64, String)>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?, table).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?, table).await,
        }
    }

    async fn insert(&self, table: Table, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("{} name cannot be empty", table.name());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => insert_sqlite(self.pool.sqlite()?, table, name).await,
            DatabaseDriver::Mysql => insert_mysql(self.pool.mysql()?, table, name).await,
        }
    }
}

#[async_trait]
impl DirectoryRepository for SqlxDirectoryRepository {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = self.list(Table::Categories).await?;
        Ok(rows.into_iter().map(|(id, name)| Category::new(id, name)).collect())
    }

    async fn list_levels(&self) -> Result<Vec<Level>> {
        let rows = self.list(Table::Levels).await?;
        Ok(rows.into_iter().map(|(id, name)| Level::new(id, name)).collect())
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        let id = self.insert(Table::Categories, name).await?;
        Ok(Category::new(id, name.trim()))
    }

    async fn create_level(&self, name: &str) -> Result<Level> {
        let id = self.insert(Table::Levels, name).await?;
        Ok(Level::new(id, name.trim()))
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_sqlite(pool: &SqlitePool, table: Table) -> Result<Vec<(i64, String)>> {
    let sql = format!("SELECT id, name FROM {} ORDER BY id", table.name());
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to list {}", table.name()))?;

    rows.iter()
        .map(|row| -> Result<(i64, String)> { Ok((row.try_get("id")?, row.try_get("name")?)) })
        .collect()
}

async fn insert_sqlite(pool: &SqlitePool, table: Table, name: &str) -> Result<i64> {
    let sql = format!("INSERT INTO {} (name) VALUES (?)", table.name());
    let result = sqlx::query(&sql)
        .bind(name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to insert into {}", table.name()))?;

    Ok(result.last_insert_rowid())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_mysql(pool: &MySqlPool, table: Table) -> Result<Vec<(i64, String)>> {
    let sql = format!("SELECT id, name FROM {} ORDER BY id", table.name());
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to list {}", table.name()))?;

    rows.iter()
        .map(|row| -> Result<(i64, String)> { Ok((row.try_get("id")?, row.try_get("name")?)) })
        .collect()
}

async fn insert_mysql(pool: &MySqlPool, table: Table, name: &str) -> Result<i64> {
    let sql = format!("INSERT INTO {} (name) VALUES (?)", table.name());
    let result = sqlx::query(&sql)
        .bind(name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to insert into {}", table.name()))?;

    Ok(result.last_insert_id() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxDirectoryRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxDirectoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_categories_roundtrip() {
        let repo = setup_test_repo().await;
        assert!(repo.list_categories().await.unwrap().is_empty());

        let pedagogy = repo.create_category("Pedagogía").await.unwrap();
        let math = repo.create_category("  Matemática ").await.unwrap();
        assert_eq!(math.name, "Matemática");

        let listed = repo.list_categories().await.unwrap();
        assert_eq!(listed, vec![pedagogy, math]);
    }

    #[tokio::test]
    async fn test_levels_roundtrip() {
        let repo = setup_test_repo().await;
        let inicial = repo.create_level("Inicial").await.unwrap();
        let primaria = repo.create_level("Primaria").await.unwrap();
        assert_ne!(inicial.id, primaria.id);
        assert_eq!(repo.list_levels().await.unwrap(), vec![inicial, primaria]);
    }

    #[tokio::test]
    async fn test_duplicate_and_empty_names_rejected() {
        let repo = setup_test_repo().await;
        repo.create_category("Arte").await.unwrap();
        assert!(repo.create_category("Arte").await.is_err());
        assert!(repo.create_level("   ").await.is_err());
    }
}
