use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info};

use super::{duplicate_name, ProductStore};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{NewProduct, Product, ProductUpdate};

const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id          SERIAL PRIMARY KEY,
    name        VARCHAR(120) NOT NULL UNIQUE,
    description VARCHAR(255) NOT NULL DEFAULT '',
    price       NUMERIC(10, 2) NOT NULL CHECK (price >= 0)
)
"#;

/// Postgres-backed product store. Owns the connection pool for the lifetime of the
/// service.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the pool and make sure the `products` table exists.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        info!("Database connection pool established.");

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(CREATE_PRODUCTS_TABLE).execute(&self.pool).await?;
        info!("Schema ready.");
        Ok(())
    }
}

fn map_insert_error(err: sqlx::Error, name: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => duplicate_name(name),
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price FROM products ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price FROM products WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn insert(&self, product: &NewProduct) -> AppResult<Product> {
        // Dropping `tx` without commit rolls it back.
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, price
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, &product.name))?;

        tx.commit().await?;
        debug!(id = created.id, "Committed insert");
        Ok(created)
    }

    async fn update_by_name(&self, name: &str, patch: &ProductUpdate) -> AppResult<Option<Product>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET description = COALESCE($1, description),
                price       = COALESCE($2, price)
            WHERE name = $3
            RETURNING id, name, description, price
            "#,
        )
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_some() {
            tx.commit().await?;
        }
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<Option<Product>> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, Product>(
            "DELETE FROM products WHERE id = $1 RETURNING id, name, description, price",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if deleted.is_some() {
            tx.commit().await?;
        }
        Ok(deleted)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
    }
}
