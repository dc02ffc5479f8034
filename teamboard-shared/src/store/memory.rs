/// In-memory document store
///
/// Keeps each collection in a `HashMap` behind a Tokio `RwLock`. Filters are
/// evaluated against the serialized form of each document, so behavior
/// matches the PostgreSQL adapter field for field.

use super::{Document, DocumentStore, Filter, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Thread-safe in-memory store for one collection
#[derive(Debug, Clone)]
pub struct InMemoryStore<D> {
    documents: Arc<RwLock<HashMap<Uuid, D>>>,
}

impl<D> Default for InMemoryStore<D> {
    fn default() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<D: Document> InMemoryStore<D> {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn matching<D: Document>(document: &D, filter: &Filter) -> StoreResult<bool> {
    let json = serde_json::to_value(document)?;
    Ok(filter.matches(&json))
}

#[async_trait]
impl<D: Document> DocumentStore<D> for InMemoryStore<D> {
    async fn save(&self, document: &D) -> StoreResult<()> {
        let mut documents = self.documents.write().await;

        if let Some((field, value)) = document.unique_key() {
            let taken = documents.values().any(|other| {
                other.id() != document.id()
                    && other.unique_key().is_some_and(|(_, other_value)| other_value == value)
            });
            if taken {
                return Err(StoreError::Conflict(format!(
                    "{} '{}' already exists in {}",
                    field,
                    value,
                    D::COLLECTION
                )));
            }
        }

        documents.insert(document.id(), document.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<D>> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<D>> {
        Ok(self.documents.read().await.values().cloned().collect())
    }

    async fn find_by(&self, filter: &Filter) -> StoreResult<Vec<D>> {
        let documents = self.documents.read().await;
        let mut found = Vec::new();
        for document in documents.values() {
            if matching(document, filter)? {
                found.push(document.clone());
            }
        }
        Ok(found)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.documents.write().await.remove(&id).is_some())
    }

    async fn delete_by(&self, filter: &Filter) -> StoreResult<u64> {
        let mut documents = self.documents.write().await;
        let mut doomed = Vec::new();
        for (id, document) in documents.iter() {
            if matching(document, filter)? {
                doomed.push(*id);
            }
        }
        for id in &doomed {
            documents.remove(id);
        }
        Ok(doomed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Card {
        id: Uuid,
        owner: String,
        tags: Vec<String>,
    }

    impl Document for Card {
        const COLLECTION: &'static str = "cards";

        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn card(owner: &str, tags: &[&str]) -> Card {
        Card {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let store: InMemoryStore<Card> = InMemoryStore::new();
        let c = card("alice", &[]);
        store.save(&c).await.unwrap();

        assert_eq!(store.find_by_id(c.id).await.unwrap(), Some(c.clone()));
        assert_eq!(store.find_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let store: InMemoryStore<Card> = InMemoryStore::new();
        let mut c = card("alice", &[]);
        store.save(&c).await.unwrap();

        c.owner = "bob".to_string();
        store.save(&c).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.find_by_id(c.id).await.unwrap().unwrap().owner, "bob");
    }

    #[tokio::test]
    async fn test_find_by_filters() {
        let store: InMemoryStore<Card> = InMemoryStore::new();
        store.save(&card("alice", &["red"])).await.unwrap();
        store.save(&card("alice", &["blue"])).await.unwrap();
        store.save(&card("bob", &["red", "blue"])).await.unwrap();

        assert_eq!(store.find_by(&Filter::eq("owner", "alice")).await.unwrap().len(), 2);
        assert_eq!(store.find_by(&Filter::contains("tags", "red")).await.unwrap().len(), 2);
        assert!(store.find_by(&Filter::eq("owner", "carol")).await.unwrap().is_empty());
        assert_eq!(store.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_by_is_idempotent() {
        let store: InMemoryStore<Card> = InMemoryStore::new();
        store.save(&card("alice", &[])).await.unwrap();
        store.save(&card("alice", &[])).await.unwrap();
        store.save(&card("bob", &[])).await.unwrap();

        let filter = Filter::eq("owner", "alice");
        assert_eq!(store.delete_by(&filter).await.unwrap(), 2);
        assert_eq!(store.delete_by(&filter).await.unwrap(), 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let store: InMemoryStore<Card> = InMemoryStore::new();
        let c = card("alice", &[]);
        store.save(&c).await.unwrap();

        assert!(store.delete_by_id(c.id).await.unwrap());
        assert!(!store.delete_by_id(c.id).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Badge {
        id: Uuid,
        code: String,
    }

    impl Document for Badge {
        const COLLECTION: &'static str = "badges";

        fn id(&self) -> Uuid {
            self.id
        }

        fn unique_key(&self) -> Option<(&'static str, String)> {
            Some(("code", self.code.clone()))
        }
    }

    #[tokio::test]
    async fn test_save_rejects_taken_unique_key() {
        let store: InMemoryStore<Badge> = InMemoryStore::new();
        let mut first = Badge {
            id: Uuid::new_v4(),
            code: "gold".to_string(),
        };
        store.save(&first).await.unwrap();

        let clash = Badge {
            id: Uuid::new_v4(),
            code: "gold".to_string(),
        };
        let err = store.save(&clash).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.len().await, 1);

        // Re-saving the holder of the key is an update, not a clash
        first.code = "gold".to_string();
        store.save(&first).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
