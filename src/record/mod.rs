//! Record Module
//!
//! CRUD facade over the user table. Every operation is a single statement;
//! atomicity is whatever the backing store gives one statement.

mod sql;
mod user;

use async_trait::async_trait;

use crate::error::Result;

pub use sql::{SqlRecordStore, USER_TABLE};
pub use user::User;

// == Record Store ==
/// CRUD operations for [`User`] rows keyed by `id`.
///
/// Counts are rows affected as reported by the store. Absent rows are never
/// errors; constraint and connectivity failures come back unchanged.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Deletes the row with `id`, returning 0 when it does not exist.
    async fn delete_by_key(&self, id: i64) -> Result<u64>;

    /// Inserts every column, unset fields as NULL. Fails on a duplicate key.
    async fn insert(&self, user: &User) -> Result<u64>;

    /// Inserts the key and the assigned fields only; the store fills in defaults.
    async fn insert_selective(&self, user: &User) -> Result<u64>;

    async fn select_by_key(&self, id: i64) -> Result<Option<User>>;

    /// Updates only the assigned fields of the row with `user.id`.
    async fn update_by_key_selective(&self, user: &User) -> Result<u64>;

    /// Overwrites every business column of the row with `user.id`.
    async fn update_by_key(&self, user: &User) -> Result<u64>;
}
