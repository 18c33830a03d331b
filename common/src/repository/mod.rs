pub mod memory_repository;
pub mod mongo_repository;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::error;

/// Document store seam. Filters are plain equality documents, `sort` maps
/// field names to `1` (ascending) or `-1` (descending).
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Persists `item` and returns the identifier the store assigned to it.
    async fn insert(&self, item: &T) -> error::Result<ObjectId>;
    async fn insert_many(&self, items: &[T]) -> error::Result<usize>;
    async fn find_one(&self, filter: Document) -> error::Result<Option<T>>;
    async fn find_many(&self, filter: Document, sort: Document) -> error::Result<Vec<T>>;
    /// Applies `changes` as a partial merge to the first document matching
    /// `filter`. Returns the number of documents actually modified.
    async fn update_one(&self, filter: Document, changes: Document) -> error::Result<u64>;
    async fn delete_one(&self, filter: Document) -> error::Result<u64>;
    /// Documents are purged once `field` is older than `ttl`.
    async fn expire_after(&self, field: &str, ttl: Duration) -> error::Result<()>;
}

pub type RepositoryObject<T> = Arc<dyn Repository<T>>;
