use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use nordic_catalog::{InventoryEntry, NewInventoryEntry, SalesHistory, StockKey};
use nordic_core::repository::InventoryRepository;
use nordic_core::StoreResult;

use crate::database::db_err;

const ENTRY_COLUMNS: &str = "id, retailer_id, product_name, quantity, expiry_date, country, month, cost_price, selling_price, sales, created_at";

pub struct StoreInventoryRepository {
    pool: PgPool,
}

impl StoreInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    retailer_id: Uuid,
    product_name: String,
    quantity: i64,
    expiry_date: Option<NaiveDate>,
    country: String,
    month: i32,
    cost_price: Option<f64>,
    selling_price: Option<f64>,
    sales: i64,
    created_at: DateTime<Utc>,
}

impl From<EntryRow> for InventoryEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            retailer_id: row.retailer_id,
            product_name: row.product_name,
            quantity: row.quantity,
            expiry_date: row.expiry_date,
            country: row.country,
            month: u32::try_from(row.month).unwrap_or_default(),
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            sales: row.sales,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl InventoryRepository for StoreInventoryRepository {
    async fn record_intake(&self, retailer_id: Uuid, entry: &NewInventoryEntry) -> StoreResult<InventoryEntry> {
        let record = InventoryEntry::from_new(retailer_id, entry);
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(&format!(
            "INSERT INTO inventory_entries ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            ENTRY_COLUMNS
        ))
        .bind(record.id)
        .bind(record.retailer_id)
        .bind(&record.product_name)
        .bind(record.quantity)
        .bind(record.expiry_date)
        .bind(&record.country)
        .bind(record.month as i32)
        .bind(record.cost_price)
        .bind(record.selling_price)
        .bind(record.sales)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        // Prices only overwrite the stock record when the intake carries them
        sqlx::query(
            r#"
            INSERT INTO stock (retailer_id, product_name, country, quantity, current_price, cost_price, selling_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (retailer_id, product_name, country) DO UPDATE SET
                quantity = stock.quantity + EXCLUDED.quantity,
                current_price = COALESCE(EXCLUDED.current_price, stock.current_price),
                cost_price = COALESCE(EXCLUDED.cost_price, stock.cost_price),
                selling_price = COALESCE(EXCLUDED.selling_price, stock.selling_price),
                updated_at = NOW()
            "#,
        )
        .bind(retailer_id)
        .bind(&entry.product_name)
        .bind(&entry.country)
        .bind(entry.quantity.max(0))
        .bind(entry.current_price)
        .bind(entry.cost_price)
        .bind(entry.selling_price)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        info!("Recorded intake of {} x {} for {}", record.quantity, record.product_name, retailer_id);
        Ok(record)
    }

    async fn list_entries(&self, retailer_id: Uuid) -> StoreResult<Vec<InventoryEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {} FROM inventory_entries WHERE retailer_id = $1 ORDER BY created_at",
            ENTRY_COLUMNS
        ))
        .bind(retailer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn sales_history(&self, key: &StockKey) -> StoreResult<SalesHistory> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            SELECT {} FROM inventory_entries
            WHERE retailer_id = $1 AND product_name = $2 AND country = $3
            ORDER BY created_at DESC
            "#,
            ENTRY_COLUMNS
        ))
        .bind(key.retailer_id)
        .bind(&key.product_name)
        .bind(&key.country)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let entries: Vec<InventoryEntry> = rows.into_iter().map(Into::into).collect();
        Ok(SalesHistory::from_entries(&entries))
    }

    async fn entries_for_country(&self, country: &str) -> StoreResult<Vec<InventoryEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {} FROM inventory_entries WHERE country = $1 ORDER BY created_at",
            ENTRY_COLUMNS
        ))
        .bind(country)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
