//! SQL Record Store
//!
//! `RecordStore` backed by an sqlx `AnyPool`. Statements use `?` placeholders,
//! which both the MySQL and SQLite drivers accept.

use async_trait::async_trait;
use sqlx::any::{AnyArguments, AnyPoolOptions};
use sqlx::query::Query;
use sqlx::{Any, AnyPool};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::record::user::ColumnValue;
use crate::record::{RecordStore, User};

/// Table holding user rows
pub const USER_TABLE: &str = "users";

const SELECT_COLUMNS: &str = "id, name, email, age, created_at";

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

// == SQL Record Store ==
/// Record store delegating every call to one parameterized statement.
#[derive(Debug, Clone)]
pub struct SqlRecordStore {
    pool: AnyPool,
}

impl SqlRecordStore {
    // == Constructor ==
    /// Wraps an existing pool.
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from the configured `DATABASE_URL`.
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.database_url)
            .await?;

        info!(
            "Record store connected: max_connections={}",
            config.db_max_connections
        );
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    // == Ensure Schema ==
    /// Creates the user table when it does not exist yet.
    ///
    /// `age` carries a store default so selective inserts have something to fall back on.
    pub async fn ensure_schema(&self) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {USER_TABLE} (\
             id BIGINT PRIMARY KEY, \
             name VARCHAR(255), \
             email VARCHAR(255), \
             age BIGINT DEFAULT 0, \
             created_at BIGINT)"
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        info!("Schema ready for table {}", USER_TABLE);
        Ok(())
    }

    async fn execute(&self, sql: &str, values: Vec<ColumnValue>, id: i64) -> Result<u64> {
        let mut query = sqlx::query(sql);
        for value in values {
            query = bind_value(query, value);
        }
        let result = query.bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn insert_columns(
        &self,
        user: &User,
        columns: Vec<(&'static str, ColumnValue)>,
    ) -> Result<u64> {
        let mut names = vec!["id"];
        names.extend(columns.iter().map(|(name, _)| *name));
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "INSERT INTO {USER_TABLE} ({}) VALUES ({placeholders})",
            names.join(", ")
        );
        debug!("insert: {}", sql);

        let mut query = sqlx::query(&sql).bind(user.id);
        for (_, value) in columns {
            query = bind_value(query, value);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn update_columns(
        &self,
        user: &User,
        columns: Vec<(&'static str, ColumnValue)>,
    ) -> Result<u64> {
        let assignments: Vec<String> = columns
            .iter()
            .map(|(name, _)| format!("{name} = ?"))
            .collect();
        let sql = format!(
            "UPDATE {USER_TABLE} SET {} WHERE id = ?",
            assignments.join(", ")
        );
        debug!("update: {}", sql);

        let values = columns.into_iter().map(|(_, value)| value).collect();
        self.execute(&sql, values, user.id).await
    }
}

fn bind_value(query: AnyQuery<'_>, value: ColumnValue) -> AnyQuery<'_> {
    match value {
        ColumnValue::Text(v) => query.bind(v),
        ColumnValue::Int(v) => query.bind(v),
    }
}

#[async_trait]
impl RecordStore for SqlRecordStore {
    async fn delete_by_key(&self, id: i64) -> Result<u64> {
        let sql = format!("DELETE FROM {USER_TABLE} WHERE id = ?");
        debug!("delete_by_key: id={}", id);
        self.execute(&sql, Vec::new(), id).await
    }

    async fn insert(&self, user: &User) -> Result<u64> {
        self.insert_columns(user, user.columns()).await
    }

    async fn insert_selective(&self, user: &User) -> Result<u64> {
        self.insert_columns(user, user.assigned_columns()).await
    }

    async fn select_by_key(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM {USER_TABLE} WHERE id = ?");
        debug!("select_by_key: id={}", id);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_by_key_selective(&self, user: &User) -> Result<u64> {
        let columns = user.assigned_columns();
        if columns.is_empty() {
            debug!("update_by_key_selective: nothing assigned for id={}", user.id);
            return Ok(0);
        }
        self.update_columns(user, columns).await
    }

    async fn update_by_key(&self, user: &User) -> Result<u64> {
        self.update_columns(user, user.columns()).await
    }
}
