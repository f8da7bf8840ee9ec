use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};

type DocumentRow = (Uuid, Json<Map<String, Value>>);

/// Документы бронирований в JSONB-колонке таблицы `ticket_bookings`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pub pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }
}

fn into_document((id, Json(body)): DocumentRow) -> Document {
    Document { id, body }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, body: Map<String, Value>) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO ticket_bookings (id, document) VALUES ($1, $2)")
            .bind(id)
            .bind(Json(&body))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find(&self) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, document FROM ticket_bookings ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_document).collect())
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, document FROM ticket_bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_document))
    }

    async fn update_one(&self, id: Uuid, patch: Map<String, Value>) -> Result<u64, StoreError> {
        // jsonb || jsonb: ключи из patch перезаписывают существующие, остальные не трогаем
        let result = sqlx::query(
            "UPDATE ticket_bookings
             SET document = document || $2, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(Json(&patch))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_one(&self, id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM ticket_bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
