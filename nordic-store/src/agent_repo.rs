use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use nordic_core::models::{DeliveryAgent, NewDeliveryAgent};
use nordic_core::repository::AgentRepository;
use nordic_core::StoreResult;
use nordic_shared::Masked;

use crate::database::db_err;

pub struct StoreAgentRepository {
    pool: PgPool,
}

impl StoreAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    id: Uuid,
    retailer_id: Uuid,
    delivery_name: String,
    delivery_number: String,
    location: String,
    created_at: DateTime<Utc>,
}

impl From<AgentRow> for DeliveryAgent {
    fn from(row: AgentRow) -> Self {
        Self {
            id: row.id,
            retailer_id: row.retailer_id,
            delivery_name: row.delivery_name,
            delivery_number: Masked(row.delivery_number),
            location: row.location,
            created_at: row.created_at,
        }
    }
}

/// Escape LIKE wildcards so user input is matched literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl AgentRepository for StoreAgentRepository {
    async fn add_agent(&self, retailer_id: Uuid, agent: &NewDeliveryAgent) -> StoreResult<DeliveryAgent> {
        let row = sqlx::query_as::<_, AgentRow>(
            r#"
            INSERT INTO delivery_agents (id, retailer_id, delivery_name, delivery_number, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, retailer_id, delivery_name, delivery_number, location, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(retailer_id)
        .bind(&agent.delivery_name)
        .bind(&agent.delivery_number)
        .bind(&agent.location)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    async fn list_agents(&self, retailer_id: Uuid, location: Option<&str>) -> StoreResult<Vec<DeliveryAgent>> {
        let rows = sqlx::query_as::<_, AgentRow>(
            r#"
            SELECT id, retailer_id, delivery_name, delivery_number, location, created_at
            FROM delivery_agents
            WHERE retailer_id = $1 AND ($2::TEXT IS NULL OR location ILIKE $2)
            ORDER BY created_at
            "#,
        )
        .bind(retailer_id)
        .bind(location.map(like_pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("oslo"), "%oslo%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
