use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

/// Persist a candidate and return the stored record
/// with its generated key.
#[async_trait]
pub trait Insert<T> {
    type New;
    async fn insert(&self, item: Self::New) -> Result<T>;
}

#[async_trait]
pub trait Retrieve<T> {
    type Key;
    async fn retrieve(&self, key: Self::Key) -> Result<T>;
}

/// Apply a single narrow change to a stored record.
/// There is no whole-record update.
#[async_trait]
pub trait Update<T> {
    type Key;
    type Change;
    async fn update(&self, key: Self::Key, change: Self::Change) -> Result<T>;
}
