use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use nordic_catalog::{SaleOutcome, StockKey, StockRecord};
use nordic_core::models::StockFilter;
use nordic_core::repository::StockRepository;
use nordic_core::StoreResult;

use crate::database::db_err;

const STOCK_COLUMNS: &str = "retailer_id, product_name, country, quantity, current_price, cost_price, selling_price, created_at, updated_at";

pub struct StoreStockRepository {
    pool: PgPool,
}

impl StoreStockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StockRow {
    retailer_id: Uuid,
    product_name: String,
    country: String,
    quantity: i64,
    current_price: Option<f64>,
    cost_price: Option<f64>,
    selling_price: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockRow> for StockRecord {
    fn from(row: StockRow) -> Self {
        Self {
            retailer_id: row.retailer_id,
            product_name: row.product_name,
            country: row.country,
            quantity: row.quantity,
            current_price: row.current_price,
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl StockRepository for StoreStockRepository {
    async fn get_stock(&self, key: &StockKey) -> StoreResult<Option<StockRecord>> {
        let row = sqlx::query_as::<_, StockRow>(&format!(
            "SELECT {} FROM stock WHERE retailer_id = $1 AND product_name = $2 AND country = $3",
            STOCK_COLUMNS
        ))
        .bind(key.retailer_id)
        .bind(&key.product_name)
        .bind(&key.country)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    async fn list_stock(&self, retailer_id: Uuid, filter: &StockFilter) -> StoreResult<Vec<StockRecord>> {
        let rows = sqlx::query_as::<_, StockRow>(&format!(
            r#"
            SELECT {} FROM stock
            WHERE retailer_id = $1
              AND ($2::TEXT IS NULL OR product_name = $2)
              AND ($3::TEXT IS NULL OR country = $3)
            ORDER BY country, product_name
            "#,
            STOCK_COLUMNS
        ))
        .bind(retailer_id)
        .bind(&filter.product_name)
        .bind(&filter.country)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_price(&self, key: &StockKey, price: f64) -> StoreResult<bool> {
        // xmax is 0 only for freshly inserted tuples
        let (inserted,): (bool,) = sqlx::query_as(
            r#"
            INSERT INTO stock (retailer_id, product_name, country, quantity, current_price)
            VALUES ($1, $2, $3, 0, $4)
            ON CONFLICT (retailer_id, product_name, country)
            DO UPDATE SET current_price = EXCLUDED.current_price, updated_at = NOW()
            RETURNING (xmax = 0)
            "#,
        )
        .bind(key.retailer_id)
        .bind(&key.product_name)
        .bind(&key.country)
        .bind(price)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(inserted)
    }

    async fn sell(&self, key: &StockKey, quantity: i64) -> StoreResult<SaleOutcome> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // 1. Make sure a row exists so there is something to lock
        sqlx::query(
            r#"
            INSERT INTO stock (retailer_id, product_name, country, quantity)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (retailer_id, product_name, country) DO NOTHING
            "#,
        )
        .bind(key.retailer_id)
        .bind(&key.product_name)
        .bind(&key.country)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        // 2. Lock it; concurrent sales of the same product queue here
        let row = sqlx::query_as::<_, StockRow>(&format!(
            "SELECT {} FROM stock WHERE retailer_id = $1 AND product_name = $2 AND country = $3 FOR UPDATE",
            STOCK_COLUMNS
        ))
        .bind(key.retailer_id)
        .bind(&key.product_name)
        .bind(&key.country)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        // 3. Apply the sale with the same clamping rules as the in-memory ledger
        let mut record: StockRecord = row.into();
        let outcome = record.sell(quantity);

        sqlx::query(
            r#"
            UPDATE stock SET quantity = $4, updated_at = NOW()
            WHERE retailer_id = $1 AND product_name = $2 AND country = $3
            "#,
        )
        .bind(key.retailer_id)
        .bind(&key.product_name)
        .bind(&key.country)
        .bind(outcome.remaining_qty)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        // 4. Commit
        tx.commit().await.map_err(db_err)?;

        debug!(
            "Sold {} x {} ({}): {} -> {}",
            quantity, key.product_name, key.country, outcome.previous_qty, outcome.remaining_qty
        );
        Ok(outcome)
    }

    async fn low_stock(&self, retailer_id: Uuid, threshold: i64) -> StoreResult<Vec<StockRecord>> {
        let rows = sqlx::query_as::<_, StockRow>(&format!(
            "SELECT {} FROM stock WHERE retailer_id = $1 AND quantity < $2 ORDER BY quantity, product_name, country",
            STOCK_COLUMNS
        ))
        .bind(retailer_id)
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
