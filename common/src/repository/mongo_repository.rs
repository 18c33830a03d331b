use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use futures::StreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOptions, IndexOptions},
    IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{self, AddCode};

use super::Repository;

pub struct MongoRepository<T> {
    pub collection: mongodb::Collection<T>,
}

impl<T> MongoRepository<T> {
    pub async fn new(mongo_uri: &str, database: &str, collection: &str) -> error::Result<Self> {
        let collection = mongodb::Client::with_uri_str(mongo_uri)
            .await?
            .database(database)
            .collection(collection);
        log::info!("Connected to {}.{}", database, collection.name());
        Ok(Self { collection })
    }
}

#[async_trait]
impl<T> Repository<T> for MongoRepository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn insert(&self, item: &T) -> error::Result<ObjectId> {
        let result = self.collection.insert_one(item, None).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| {
                anyhow!("Store assigned a non-ObjectId identifier: {}", result.inserted_id).code(500)
            })
    }

    async fn insert_many(&self, items: &[T]) -> error::Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }
        let result = self.collection.insert_many(items, None).await?;
        Ok(result.inserted_ids.len())
    }

    async fn find_one(&self, filter: Document) -> error::Result<Option<T>> {
        let result = self.collection.find_one(filter, None).await?;
        Ok(result)
    }

    async fn find_many(&self, filter: Document, sort: Document) -> error::Result<Vec<T>> {
        let find_options = FindOptions::builder().sort(sort).build();

        let result: Vec<mongodb::error::Result<T>> = self
            .collection
            .find(filter, find_options)
            .await?
            .collect()
            .await;
        Ok(result.into_iter().collect::<mongodb::error::Result<_>>()?)
    }

    async fn update_one(&self, filter: Document, changes: Document) -> error::Result<u64> {
        let result = self
            .collection
            .update_one(filter, doc! {"$set": changes}, None)
            .await?;
        Ok(result.modified_count)
    }

    async fn delete_one(&self, filter: Document) -> error::Result<u64> {
        let result = self.collection.delete_one(filter, None).await?;
        Ok(result.deleted_count)
    }

    async fn expire_after(&self, field: &str, ttl: Duration) -> error::Result<()> {
        let index = IndexModel::builder()
            .keys(doc! {field: 1})
            .options(IndexOptions::builder().expire_after(ttl).build())
            .build();
        let result = self.collection.create_index(index, None).await?;
        log::info!(
            "TTL index {} expires documents {}s after `{}`",
            result.index_name,
            ttl.as_secs(),
            field
        );
        Ok(())
    }
}
