use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};

/// In-process store. Keeps documents in insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, body: Map<String, Value>) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.documents.write().await.push(Document { id, body });
        Ok(id)
    }

    async fn find(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents.read().await.clone())
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|doc| doc.id == id).cloned())
    }

    async fn update_one(&self, id: Uuid, patch: Map<String, Value>) -> Result<u64, StoreError> {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|doc| doc.id == id) {
            Some(doc) => {
                doc.body.extend(patch);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut documents = self.documents.write().await;
        match documents.iter().position(|doc| doc.id == id) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn find_keeps_insertion_order() {
        let store = MemoryStore::new();
        let first = store.insert_one(fields(json!({"event": "A"}))).await.unwrap();
        let second = store.insert_one(fields(json!({"event": "B"}))).await.unwrap();
        let third = store.insert_one(fields(json!({"event": "C"}))).await.unwrap();

        let ids: Vec<Uuid> = store.find().await.unwrap().into_iter().map(|d| d.id).collect();

        assert_eq!(ids, vec![first, second, third]);
    }

    #[tokio::test]
    async fn update_merges_only_given_keys() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(fields(json!({"user_name": "Alice", "seats": 2})))
            .await
            .unwrap();

        let matched = store.update_one(id, fields(json!({"seats": 4}))).await.unwrap();
        let doc = store.find_one(id).await.unwrap().unwrap();

        assert_eq!(matched, 1);
        assert_eq!(Value::Object(doc.body), json!({"user_name": "Alice", "seats": 4}));
    }

    #[tokio::test]
    async fn empty_patch_still_matches() {
        let store = MemoryStore::new();
        let id = store.insert_one(fields(json!({"event": "A"}))).await.unwrap();

        assert_eq!(store.update_one(id, Map::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_ids_report_zero_counts() {
        let store = MemoryStore::new();
        let ghost = Uuid::new_v4();

        assert_eq!(store.update_one(ghost, Map::new()).await.unwrap(), 0);
        assert_eq!(store.delete_one(ghost).await.unwrap(), 0);
        assert!(store.find_one(ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = MemoryStore::new();
        let id = store.insert_one(Map::new()).await.unwrap();

        assert_eq!(store.delete_one(id).await.unwrap(), 1);
        assert!(store.find().await.unwrap().is_empty());
        assert_eq!(store.delete_one(id).await.unwrap(), 0);
    }
}
