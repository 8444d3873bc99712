//! User Record Module
//!
//! Defines the entity persisted by the record store.

use serde::{Deserialize, Serialize};

// == User ==
/// A persisted user row, keyed by `id`.
///
/// Business fields are optional so the selective operations can tell an
/// assigned field from one left to the store's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Identifying key, immutable once assigned
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    /// Unix timestamp in seconds
    pub created_at: Option<i64>,
}

/// A bindable column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ColumnValue {
    Text(Option<String>),
    Int(Option<i64>),
}

impl ColumnValue {
    fn is_assigned(&self) -> bool {
        match self {
            ColumnValue::Text(v) => v.is_some(),
            ColumnValue::Int(v) => v.is_some(),
        }
    }
}

impl User {
    // == Constructor ==
    /// Creates a user with only its key assigned.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_owned());
        self
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Every business column paired with its value, in table order.
    pub(crate) fn columns(&self) -> Vec<(&'static str, ColumnValue)> {
        vec![
            ("name", ColumnValue::Text(self.name.clone())),
            ("email", ColumnValue::Text(self.email.clone())),
            ("age", ColumnValue::Int(self.age)),
            ("created_at", ColumnValue::Int(self.created_at)),
        ]
    }

    /// Only the business columns that hold a value.
    pub(crate) fn assigned_columns(&self) -> Vec<(&'static str, ColumnValue)> {
        self.columns()
            .into_iter()
            .filter(|(_, value)| value.is_assigned())
            .collect()
    }
}
