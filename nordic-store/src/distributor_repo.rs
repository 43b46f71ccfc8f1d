use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use nordic_core::models::{Distributor, NewDistributor, RestockOrder};
use nordic_core::repository::DistributorRepository;
use nordic_core::StoreResult;
use nordic_shared::models::events::RestockLine;
use nordic_shared::Masked;

use crate::database::db_err;

pub struct StoreDistributorRepository {
    pool: PgPool,
}

impl StoreDistributorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DistributorRow {
    id: Uuid,
    location: String,
    name: String,
    contact: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<DistributorRow> for Distributor {
    fn from(row: DistributorRow) -> Self {
        Self {
            id: row.id,
            location: row.location,
            name: row.name,
            contact: Masked(row.contact),
            email: row.email.map(Masked),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RestockOrderRow {
    id: Uuid,
    retailer_id: Uuid,
    city: String,
    lines: Json<Vec<RestockLine>>,
    distributor_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<RestockOrderRow> for RestockOrder {
    fn from(row: RestockOrderRow) -> Self {
        Self {
            id: row.id,
            retailer_id: row.retailer_id,
            city: row.city,
            lines: row.lines.0,
            distributor_ids: row.distributor_ids,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl DistributorRepository for StoreDistributorRepository {
    async fn add_distributors(&self, location: &str, distributors: &[NewDistributor]) -> StoreResult<Vec<Distributor>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut created = Vec::with_capacity(distributors.len());

        for distributor in distributors {
            let row = sqlx::query_as::<_, DistributorRow>(
                r#"
                INSERT INTO distributors (id, location, name, contact, email)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, location, name, contact, email, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(location.trim())
            .bind(&distributor.name)
            .bind(&distributor.contact)
            .bind(&distributor.email)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
            created.push(row.into());
        }

        tx.commit().await.map_err(db_err)?;
        Ok(created)
    }

    async fn list_distributors(&self, location: Option<&str>) -> StoreResult<Vec<Distributor>> {
        let rows = sqlx::query_as::<_, DistributorRow>(
            r#"
            SELECT id, location, name, contact, email, created_at
            FROM distributors
            WHERE ($1::TEXT IS NULL OR LOWER(location) = LOWER($1))
            ORDER BY location, name
            "#,
        )
        .bind(location.map(str::trim))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_restock_order(&self, order: &RestockOrder) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO restock_orders (id, retailer_id, city, lines, distributor_ids, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id)
        .bind(order.retailer_id)
        .bind(&order.city)
        .bind(Json(&order.lines))
        .bind(&order.distributor_ids)
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list_restock_orders(&self, retailer_id: Uuid) -> StoreResult<Vec<RestockOrder>> {
        let rows = sqlx::query_as::<_, RestockOrderRow>(
            r#"
            SELECT id, retailer_id, city, lines, distributor_ids, created_at
            FROM restock_orders WHERE retailer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(retailer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
