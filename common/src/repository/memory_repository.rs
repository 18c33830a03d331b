use std::{
    cmp::Ordering,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use anyhow::anyhow;
use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Bson, DateTime, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{self, AddCode};

use super::Repository;

#[derive(Default)]
struct Store {
    documents: Vec<Document>,
    expiry: Option<(String, Duration)>,
}

impl Store {
    fn purge_expired(&mut self) {
        let Some((field, ttl)) = &self.expiry else {
            return;
        };
        let cutoff = DateTime::now().timestamp_millis() - ttl.as_millis() as i64;
        self.documents
            .retain(|document| match document.get_datetime(field) {
                Ok(from) => from.timestamp_millis() > cutoff,
                Err(_) => true,
            });
    }
}

/// Process-local store with the subset of MongoDB semantics the services rely on:
/// equality filters, multi-key sort, `$set` merges and TTL expiry (applied lazily
/// whenever the store is touched).
pub struct InMemoryRepository<T> {
    _t: std::marker::PhantomData<T>,
    db: Mutex<Store>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            _t: std::marker::PhantomData,
            db: Mutex::new(Store::default()),
        }
    }

    fn lock(&self) -> error::Result<MutexGuard<'_, Store>> {
        let mut store = self
            .db
            .lock()
            .map_err(|_| anyhow!("In-memory store lock poisoned").code(500))?;
        store.purge_expired();
        Ok(store)
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Bson::DateTime(a), Bson::DateTime(b)) => a.cmp(b),
            (Bson::String(a), Bson::String(b)) => a.cmp(b),
            (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
            (Bson::ObjectId(a), Bson::ObjectId(b)) => a.cmp(b),
            (Bson::Int32(a), Bson::Int32(b)) => a.cmp(b),
            (Bson::Int64(a), Bson::Int64(b)) => a.cmp(b),
            _ => Ordering::Equal,
        },
    }
}

fn is_descending(direction: &Bson) -> bool {
    match direction {
        Bson::Int32(direction) => *direction < 0,
        Bson::Int64(direction) => *direction < 0,
        Bson::Double(direction) => *direction < 0.0,
        _ => false,
    }
}

fn compare(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (key, direction) in sort {
        let ordering = compare_values(a.get(key), b.get(key));
        let ordering = if is_descending(direction) {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn insert(&self, item: &T) -> error::Result<ObjectId> {
        let mut document = bson::to_document(item)?;
        let id = match document.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        let mut store = self.lock()?;
        let contains = store
            .documents
            .iter()
            .any(|x| x.get_object_id("_id").ok() == Some(id));
        if contains {
            return Err(anyhow!("Duplicate key _id: {}", id).code(409));
        }
        store.documents.push(document);
        Ok(id)
    }

    async fn insert_many(&self, items: &[T]) -> error::Result<usize> {
        for item in items {
            self.insert(item).await?;
        }
        Ok(items.len())
    }

    async fn find_one(&self, filter: Document) -> error::Result<Option<T>> {
        let store = self.lock()?;
        let document = store
            .documents
            .iter()
            .find(|x| matches(x, &filter))
            .cloned();
        drop(store);

        Ok(document.map(bson::from_document).transpose()?)
    }

    async fn find_many(&self, filter: Document, sort: Document) -> error::Result<Vec<T>> {
        let store = self.lock()?;
        let mut documents: Vec<Document> = store
            .documents
            .iter()
            .filter(|x| matches(x, &filter))
            .cloned()
            .collect();
        drop(store);

        documents.sort_by(|a, b| compare(a, b, &sort));
        Ok(documents
            .into_iter()
            .map(bson::from_document)
            .collect::<Result<_, _>>()?)
    }

    async fn update_one(&self, filter: Document, changes: Document) -> error::Result<u64> {
        let mut store = self.lock()?;
        let Some(document) = store.documents.iter_mut().find(|x| matches(x, &filter)) else {
            return Ok(0);
        };

        // a document only counts as modified if some value actually changed
        let mut modified = false;
        for (key, value) in changes {
            if document.get(&key) != Some(&value) {
                document.insert(key, value);
                modified = true;
            }
        }
        Ok(modified as u64)
    }

    async fn delete_one(&self, filter: Document) -> error::Result<u64> {
        let mut store = self.lock()?;
        let Some(position) = store.documents.iter().position(|x| matches(x, &filter)) else {
            return Ok(0);
        };
        store.documents.remove(position);
        Ok(1)
    }

    async fn expire_after(&self, field: &str, ttl: Duration) -> error::Result<()> {
        let mut store = self.lock()?;
        store.expiry = Some((field.to_string(), ttl));
        store.purge_expired();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{Duration as ChronoDuration, Utc};
    use mongodb::bson::{doc, oid::ObjectId};

    use super::InMemoryRepository;
    use crate::{entities::issue::Issue, repository::Repository};

    fn issue(project: &str, title: &str) -> Issue {
        let now = Utc::now();
        Issue {
            id: None,
            project_name: project.to_string(),
            issue_title: title.to_string(),
            issue_text: "text".to_string(),
            created_by: "tester".to_string(),
            assigned_to: String::new(),
            status_text: String::new(),
            open: true,
            created_on: now,
            updated_on: now,
            expire_from: now,
        }
    }

    #[actix_web::test]
    async fn insert_assigns_id() {
        let repo = InMemoryRepository::<Issue>::new();
        let id = repo.insert(&issue("alpha", "first")).await.unwrap();

        let found = repo.find_one(doc! {"_id": id}).await.unwrap().unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.issue_title, "first");
    }

    #[actix_web::test]
    async fn insert_rejects_duplicate_id() {
        let repo = InMemoryRepository::<Issue>::new();
        let mut item = issue("alpha", "first");
        item.id = Some(ObjectId::new());

        repo.insert(&item).await.unwrap();
        let err = repo.insert(&item).await.unwrap_err();
        assert_eq!(err.code, 409);
    }

    #[actix_web::test]
    async fn find_many_filters_and_sorts() {
        let repo = InMemoryRepository::<Issue>::new();
        repo.insert_many(&[
            issue("alpha", "b"),
            issue("beta", "a"),
            issue("alpha", "c"),
            issue("alpha", "a"),
        ])
        .await
        .unwrap();

        let ascending = repo
            .find_many(doc! {"project_name": "alpha"}, doc! {"issue_title": 1})
            .await
            .unwrap();
        let titles: Vec<_> = ascending.iter().map(|x| x.issue_title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);

        let descending = repo
            .find_many(doc! {"project_name": "alpha"}, doc! {"issue_title": -1})
            .await
            .unwrap();
        let titles: Vec<_> = descending.iter().map(|x| x.issue_title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[actix_web::test]
    async fn update_counts_only_real_changes() {
        let repo = InMemoryRepository::<Issue>::new();
        let id = repo.insert(&issue("alpha", "first")).await.unwrap();

        let modified = repo
            .update_one(doc! {"_id": id}, doc! {"issue_title": "first"})
            .await
            .unwrap();
        assert_eq!(modified, 0);

        let modified = repo
            .update_one(doc! {"_id": id}, doc! {"issue_title": "renamed", "open": false})
            .await
            .unwrap();
        assert_eq!(modified, 1);

        let found = repo.find_one(doc! {"_id": id}).await.unwrap().unwrap();
        assert_eq!(found.issue_title, "renamed");
        assert!(!found.open);
        assert_eq!(found.issue_text, "text");
    }

    #[actix_web::test]
    async fn update_and_delete_respect_filter_scope() {
        let repo = InMemoryRepository::<Issue>::new();
        let id = repo.insert(&issue("alpha", "first")).await.unwrap();

        let scope = doc! {"project_name": "beta", "_id": id};
        assert_eq!(repo.update_one(scope.clone(), doc! {"open": false}).await.unwrap(), 0);
        assert_eq!(repo.delete_one(scope).await.unwrap(), 0);

        assert_eq!(
            repo.delete_one(doc! {"project_name": "alpha", "_id": id})
                .await
                .unwrap(),
            1
        );
        assert!(repo.find_one(doc! {"_id": id}).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn expired_documents_are_purged() {
        let repo = InMemoryRepository::<Issue>::new();
        let mut stale = issue("alpha", "stale");
        stale.expire_from = Utc::now() - ChronoDuration::days(2);
        repo.insert(&stale).await.unwrap();
        repo.insert(&issue("alpha", "fresh")).await.unwrap();

        repo.expire_after(Issue::EXPIRE_FROM, Duration::from_secs(86400))
            .await
            .unwrap();

        let left = repo
            .find_many(doc! {"project_name": "alpha"}, doc! {})
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].issue_title, "fresh");
    }
}
