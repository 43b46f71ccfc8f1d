use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use nordic_core::models::{NewRetailer, Retailer};
use nordic_core::repository::RetailerRepository;
use nordic_core::StoreResult;
use nordic_shared::Masked;

use crate::database::db_err;

pub struct StoreRetailerRepository {
    pool: PgPool,
}

impl StoreRetailerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RetailerRow {
    id: Uuid,
    username: String,
    email: Option<String>,
    region: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RetailerRow> for Retailer {
    fn from(row: RetailerRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email.map(Masked),
            region: row.region,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl RetailerRepository for StoreRetailerRepository {
    async fn create_retailer(&self, retailer: &NewRetailer) -> StoreResult<Retailer> {
        // Unique violation on username surfaces as StoreError::Conflict
        let row = sqlx::query_as::<_, RetailerRow>(
            r#"
            INSERT INTO retailers (id, username, email, region)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, region, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&retailer.username)
        .bind(&retailer.email)
        .bind(&retailer.region)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    async fn get_retailer(&self, id: Uuid) -> StoreResult<Option<Retailer>> {
        let row = sqlx::query_as::<_, RetailerRow>(
            "SELECT id, username, email, region, created_at FROM retailers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(Into::into))
    }
}
