use serde_json::Value;
use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::{EntitySchema, Filter, ListParams};

/// Runs a listing `Filter` against the pool: page of primary keys plus total count.
pub struct QueryBuilder<'s> {
    filter: Filter<'s>,
}

impl<'s> QueryBuilder<'s> {
    pub fn new(schema: &'s EntitySchema, params: &ListParams) -> Result<Self, DatabaseError> {
        Ok(Self { filter: Filter::new(schema, params)? })
    }

    pub async fn select_keys<K>(&self, pool: &PgPool) -> Result<Vec<K>, DatabaseError>
    where
        K: Send + Unpin,
        (K,): for<'r> FromRow<'r, PgRow>,
    {
        let sql_result = self.filter.to_sql();
        let mut q = sqlx::query_scalar::<_, K>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_scalar(q, p);
        }
        let keys = q.fetch_all(pool).await?;
        Ok(keys)
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self.filter.to_count_sql();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    /// Total is computed over the full filtered set, before paging.
    pub async fn page<K>(&self, pool: &PgPool) -> Result<(Vec<K>, i64), DatabaseError>
    where
        K: Send + Unpin,
        (K,): for<'r> FromRow<'r, PgRow>,
    {
        let total = self.count(pool).await?;
        let keys = self.select_keys::<K>(pool).await?;
        tracing::debug!("{} listing: {} of {} rows", self.filter.schema().entity, keys.len(), total);
        Ok((keys, total))
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

fn bind_param_query_scalar<'q, O>(
    q: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
