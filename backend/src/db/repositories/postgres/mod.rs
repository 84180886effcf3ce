//! Postgres repository implementation using Diesel.
//!
//! Each collection is a table of JSONB documents keyed by the hex document
//! id. The `_id` field is not stored inside the JSONB body; it is rebuilt
//! from the key column when rows are read.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Query statistics for monitoring
//! - Collections created on first connect
//!
//! Failed statements are not retried.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{Jsonb, Text};
use log::debug;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    ErrorContext, LessonRepository, OrderRepository, RepositoryError, RepositoryResult,
    UpdateOutcome, LESSONS, ORDERS,
};
use crate::models::lesson::{NUMERIC_SEARCH_FIELDS, TEXT_SEARCH_FIELDS};
use crate::models::{Document, DocumentId, LessonSearch};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const CREATE_COLLECTIONS: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS lessons (
        id TEXT PRIMARY KEY,
        document JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        document JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

/// Sets one top-level field unless it already holds the same JSON value,
/// so the affected row count is the "modified" counter.
const UPDATE_LESSON_FIELD: &str = "UPDATE lessons \
    SET document = jsonb_set(document, ARRAY[$1]::text[], $2, true) \
    WHERE id = $3 AND (document -> $1) IS DISTINCT FROM $2";

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total statements executed
    pub total_queries: u64,
    /// Total failed statements
    pub failed_queries: u64,
}

/// Diesel-backed document store on Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and make sure both collections exist.
    ///
    /// # Arguments
    /// * `config` - Database configuration
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connecting or creating the tables fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_setup"),
                )
            })?;
            Self::ensure_collections(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
        })
    }

    fn ensure_collections(conn: &mut PgConnection) -> RepositoryResult<()> {
        for statement in CREATE_COLLECTIONS {
            sql_query(statement).execute(conn).map_err(|e| {
                RepositoryError::from(e).with_operation("ensure_collections")
            })?;
        }
        Ok(())
    }

    /// Run a blocking Diesel operation on a pooled connection.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                failed_queries.fetch_add(1, Ordering::Relaxed);
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;

            total_queries.fetch_add(1, Ordering::Relaxed);
            f(&mut conn).map_err(|e| {
                failed_queries.fetch_add(1, Ordering::Relaxed);
                e.with_operation(operation)
            })
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new(operation).with_details("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn text_field_clause(field: &str) -> String {
    format!(
        "(jsonb_typeof(document -> '{field}') = 'string' \
         AND strpos(lower(document ->> '{field}'), $1) > 0)"
    )
}

/// Numbers are compared through `trim_scale` so `25.0` reads as `25`,
/// matching [`crate::models::search::stringify_number`].
fn numeric_field_clause(field: &str) -> String {
    format!(
        "(strpos(lower(CASE jsonb_typeof(document -> '{field}') \
             WHEN 'string' THEN document ->> '{field}' \
             WHEN 'number' THEN trim_scale((document ->> '{field}')::numeric)::text \
         END), $1) > 0)"
    )
}

/// SQL equivalent of [`LessonSearch::matches`]; `$1` binds the lowercased term.
fn search_sql(search: &LessonSearch) -> String {
    let mut clauses: Vec<String> = TEXT_SEARCH_FIELDS.iter().map(|f| text_field_clause(f)).collect();
    if search.is_numeric() {
        clauses.extend(NUMERIC_SEARCH_FIELDS.iter().map(|f| numeric_field_clause(f)));
    }
    format!(
        "SELECT id, document, created_at FROM lessons WHERE {} ORDER BY created_at, id",
        clauses.join(" OR ")
    )
}

fn rows_to_documents<R>(
    rows: Vec<R>,
    convert: impl Fn(R) -> RepositoryResult<Document>,
) -> RepositoryResult<Vec<Document>> {
    rows.into_iter().map(convert).collect()
}

#[async_trait]
impl LessonRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_all_lessons(&self) -> RepositoryResult<Vec<Document>> {
        self.with_conn("find_all_lessons", |conn| {
            let rows = lessons::table
                .select(LessonRow::as_select())
                .order((lessons::created_at.asc(), lessons::id.asc()))
                .load::<LessonRow>(conn)
                .map_err(|e| map_diesel_error(e).with_collection(LESSONS))?;
            rows_to_documents(rows, LessonRow::into_document)
        })
        .await
    }

    async fn find_lesson(&self, id: &DocumentId) -> RepositoryResult<Option<Document>> {
        let key = id.to_hex();
        self.with_conn("find_lesson", move |conn| {
            let row = lessons::table
                .filter(lessons::id.eq(&key))
                .select(LessonRow::as_select())
                .first::<LessonRow>(conn)
                .optional()
                .map_err(|e| map_diesel_error(e).with_collection(LESSONS))?;
            row.map(LessonRow::into_document).transpose()
        })
        .await
        .map_err(|e| e.with_document_id(id))
    }

    async fn insert_lesson(&self, lesson: Document) -> RepositoryResult<DocumentId> {
        let id = DocumentId::generate();
        let row = NewLessonRow::new(id, lesson);
        self.with_conn("insert_lesson", move |conn| {
            diesel::insert_into(lessons::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_collection(LESSONS))?;
            debug!("Inserted lesson {}", id);
            Ok(id)
        })
        .await
    }

    async fn update_lesson_field(
        &self,
        id: &DocumentId,
        field: &str,
        value: Value,
    ) -> RepositoryResult<UpdateOutcome> {
        let key = id.to_hex();
        let field = field.to_string();
        self.with_conn("update_lesson_field", move |conn| {
            let modified = sql_query(UPDATE_LESSON_FIELD)
                .bind::<Text, _>(&field)
                .bind::<Jsonb, _>(&value)
                .bind::<Text, _>(&key)
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_collection(LESSONS))?;
            if modified > 0 {
                return Ok(UpdateOutcome::MODIFIED);
            }

            let matched: i64 = lessons::table
                .filter(lessons::id.eq(&key))
                .count()
                .get_result(conn)
                .map_err(|e| map_diesel_error(e).with_collection(LESSONS))?;
            Ok(UpdateOutcome {
                matched: matched as u64,
                modified: 0,
            })
        })
        .await
        .map_err(|e| e.with_document_id(id))
    }

    async fn search_lessons(&self, search: &LessonSearch) -> RepositoryResult<Vec<Document>> {
        let sql = search_sql(search);
        let needle = search.needle().to_string();
        self.with_conn("search_lessons", move |conn| {
            let rows = sql_query(sql)
                .bind::<Text, _>(&needle)
                .load::<LessonRow>(conn)
                .map_err(|e| map_diesel_error(e).with_collection(LESSONS))?;
            rows_to_documents(rows, LessonRow::into_document)
        })
        .await
    }
}

#[async_trait]
impl OrderRepository for PostgresRepository {
    async fn find_all_orders(&self) -> RepositoryResult<Vec<Document>> {
        self.with_conn("find_all_orders", |conn| {
            let rows = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.asc(), orders::id.asc()))
                .load::<OrderRow>(conn)
                .map_err(|e| map_diesel_error(e).with_collection(ORDERS))?;
            rows_to_documents(rows, OrderRow::into_document)
        })
        .await
    }

    async fn find_order(&self, id: &DocumentId) -> RepositoryResult<Option<Document>> {
        let key = id.to_hex();
        self.with_conn("find_order", move |conn| {
            let row = orders::table
                .filter(orders::id.eq(&key))
                .select(OrderRow::as_select())
                .first::<OrderRow>(conn)
                .optional()
                .map_err(|e| map_diesel_error(e).with_collection(ORDERS))?;
            row.map(OrderRow::into_document).transpose()
        })
        .await
        .map_err(|e| e.with_document_id(id))
    }

    async fn insert_order(&self, order: Document) -> RepositoryResult<DocumentId> {
        let id = DocumentId::generate();
        let row = NewOrderRow::new(id, order);
        self.with_conn("insert_order", move |conn| {
            diesel::insert_into(orders::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_collection(ORDERS))?;
            debug!("Inserted order {}", id);
            Ok(id)
        })
        .await
    }
}
