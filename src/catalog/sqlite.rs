//! SQLite Product Store
//!
//! [`ProductStore`] over a sqlx SQLite pool. The table is created on
//! connect if missing; timestamps are stored as RFC 3339 text.
//!
//! Category filtering compares against a `category_key` column folded in
//! Rust on every write. SQLite's `LOWER()` only folds ASCII.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::info;

use super::store::ProductStore;
use crate::error::StoreError;
use crate::models::{
    category_key, NewProduct, Product, ProductFilters, ProductId, ProductPage, ProductPatch,
};

const SELECT_PRODUCTS: &str = "SELECT id, name, category, price, stock, description, available, \
                               updated_at FROM products";

const CREATE_PRODUCTS: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    category_key TEXT NOT NULL,
    price REAL NOT NULL CHECK (price >= 0),
    stock INTEGER NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT '',
    available INTEGER NOT NULL DEFAULT 1,
    updated_at TEXT NOT NULL
)
"#;

const CREATE_CATEGORY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_products_category_key ON products (category_key)";

// == SQLite Product Store ==
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
}

impl SqliteProductStore {
    /// Opens a pool for `database_url` and makes sure the table exists.
    ///
    /// `sqlite::memory:` databases live inside a single connection, so the
    /// pool is pinned to one connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let in_memory = database_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(database_url)?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        let pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(10));
        let pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .max_connections(10)
                .idle_timeout(Duration::from_secs(30))
                .max_lifetime(Duration::from_secs(1800))
        };

        let store = Self::from_pool(pool_options.connect_with(options).await?);
        store.init_schema().await?;
        info!("Product store ready at {}", database_url);
        Ok(store)
    }

    /// Wraps an existing pool without touching the schema.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the products table and its category index if missing.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_PRODUCTS).execute(&self.pool).await?;
        sqlx::query(CREATE_CATEGORY_INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("{} WHERE id = ?", SELECT_PRODUCTS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn query(&self, filters: &ProductFilters) -> Result<ProductPage, StoreError> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS total FROM products");
        push_filters(&mut count_query, filters);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_PRODUCTS);
        push_filters(&mut select, filters);
        select
            .push(" ORDER BY id LIMIT ")
            .push_bind(i64::from(filters.page_size()))
            .push(" OFFSET ")
            .push_bind(filters.offset() as i64);
        let rows = select.build().fetch_all(&self.pool).await?;

        let results = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductPage::new(results, total.max(0) as u64, filters))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut product = product.into_product(0);

        let result = sqlx::query(
            "INSERT INTO products (name, category, category_key, price, stock, description, \
             available, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(category_key(&product.category))
        .bind(product.price)
        .bind(i64::from(product.stock))
        .bind(&product.description)
        .bind(product.available)
        .bind(product.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        product.id = result.last_insert_rowid();
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{} WHERE id = ?", SELECT_PRODUCTS);
        let Some(row) = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut product = product_from_row(&row)?;
        patch.apply(&mut product);

        sqlx::query(
            "UPDATE products SET name = ?, category = ?, category_key = ?, price = ?, stock = ?, \
             description = ?, available = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(category_key(&product.category))
        .bind(product.price)
        .bind(i64::from(product.stock))
        .bind(&product.description)
        .bind(product.available)
        .bind(product.updated_at.to_rfc3339())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(product))
    }

    async fn remove(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// == Query Helpers ==
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &ProductFilters) {
    builder.push(" WHERE 1 = 1");
    if let Some(category) = filters.category() {
        builder.push(" AND category_key = ").push_bind(category);
    }
    if let Some(min) = filters.price_min {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filters.price_max {
        builder.push(" AND price <= ").push_bind(max);
    }
    if let Some(available) = filters.available {
        builder.push(" AND available = ").push_bind(available);
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, StoreError> {
    let stock: i64 = row.try_get("stock")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
        stock: u32::try_from(stock)
            .map_err(|_| StoreError::Corrupt(format!("stock {} out of range", stock)))?,
        description: row.try_get("description")?,
        available: row.try_get("available")?,
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|e| StoreError::Corrupt(format!("bad updated_at '{}': {}", updated_at, e)))?
            .with_timezone(&Utc),
    })
}
