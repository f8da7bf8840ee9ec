//! Хранилище документов, поверх которого работает репозиторий бронирований.
//!
//! Документ = UUID + JSON-объект с произвольным набором полей. Две реализации:
//! `PgDocumentStore` (JSONB-таблица в PostgreSQL) и `MemoryStore` (для тестов
//! и запуска без базы).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Raw stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Сохраняет новый документ и возвращает присвоенный id.
    async fn insert_one(&self, body: Map<String, Value>) -> Result<Uuid, StoreError>;

    /// Все документы в естественном порядке хранилища.
    async fn find(&self) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Merges `patch` into the matched document. Returns the matched count,
    /// which is 1 even when the patch changes nothing.
    async fn update_one(&self, id: Uuid, patch: Map<String, Value>) -> Result<u64, StoreError>;

    /// Returns the deleted count.
    async fn delete_one(&self, id: Uuid) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
