use crate::{
    auth::hash_password,
    error::AppError,
    models::{Record, Role, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract consumed by the views: identity lookups for the
/// authentication flow and record lookup / assignment / save for the list and
/// soft-delete views. Store failures are logged by the implementation and surface
/// as empty or `None` results.
///
/// **Send + Sync + async_trait** are required to share the trait object
/// (`Arc<dyn Repository>`) across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn find_user_by_username(&self, username: &str) -> Option<User>;
    async fn create_user(&self, user: User) -> Option<User>;

    // --- Records ---
    // `ordering` is a field name, optionally prefixed with `-` for descending order.
    async fn list_records(&self, ordering: Option<String>) -> Vec<Record>;
    async fn get_record(&self, id: Uuid) -> Option<Record>;
    async fn create_record(&self, record: Record) -> Option<Record>;
    // Persists every mutable column of `record`. Returns false if no row matched.
    async fn save_record(&self, record: &Record) -> bool;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Splits an ordering token into its field name and direction.
pub fn parse_ordering(token: &str) -> (&str, bool) {
    match token.strip_prefix('-') {
        Some(field) => (field, true),
        None => (token, false),
    }
}

// --- Postgres ---

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// ensure_schema
    ///
    /// Creates the `users` and `records` tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL DEFAULT 'user',
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                deleted_by UUID NULL REFERENCES users(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Columns of the `records` table an ordering token may name.
const RECORD_COLUMNS: [&str; 5] = ["id", "name", "category", "created_at", "deleted_by"];

/// Builds the ORDER BY clause for an ordering token. A token naming anything but a
/// `records` column yields no clause, so the rows come back in natural order.
fn order_clause(ordering: Option<&str>) -> String {
    match ordering.map(parse_ordering) {
        Some((field, descending)) if RECORD_COLUMNS.contains(&field) => format!(
            " ORDER BY \"{}\" {}",
            field,
            if descending { "DESC" } else { "ASC" }
        ),
        Some((field, _)) => {
            tracing::warn!(field, "ordering ignored: unknown column");
            String::new()
        }
        None => String::new(),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, role, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user error: {:?}", e);
            None
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Option<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, role, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_user_by_username error: {:?}", e);
            None
        })
    }

    async fn create_user(&self, user: User) -> Option<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, role, password_hash)
               VALUES ($1, $2, $3, $4)
               RETURNING id, username, role, password_hash"#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| tracing::error!("create_user error: {:?}", e))
        .ok()
    }

    /// list_records
    ///
    /// Returns every record, soft-deleted ones included; visibility is decided by
    /// the filter set sitting on top of this call.
    async fn list_records(&self, ordering: Option<String>) -> Vec<Record> {
        let query = format!(
            "SELECT id, name, category, created_at, deleted_by FROM records{}",
            order_clause(ordering.as_deref())
        );
        match sqlx::query_as::<_, Record>(&query).fetch_all(&self.pool).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("list_records error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_record(&self, id: Uuid) -> Option<Record> {
        sqlx::query_as::<_, Record>(
            "SELECT id, name, category, created_at, deleted_by FROM records WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_record error: {:?}", e);
            None
        })
    }

    async fn create_record(&self, record: Record) -> Option<Record> {
        sqlx::query_as::<_, Record>(
            r#"INSERT INTO records (id, name, category, created_at, deleted_by)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, name, category, created_at, deleted_by"#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.category)
        .bind(record.created_at)
        .bind(record.deleted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| tracing::error!("create_record error: {:?}", e))
        .ok()
    }

    async fn save_record(&self, record: &Record) -> bool {
        let result = sqlx::query(
            "UPDATE records SET name = $2, category = $3, deleted_by = $4 WHERE id = $1",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.category)
        .bind(record.deleted_by)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("save_record error: {:?}", e);
                false
            }
        }
    }
}

// --- In-memory ---

#[derive(Default)]
struct MemoryTables {
    users: HashMap<Uuid, User>,
    // Insertion order is the "natural" order returned when no ordering applies.
    records: Vec<Record>,
}

/// InMemoryRepository
///
/// A `Repository` kept entirely in process memory. Used for local runs without a
/// database and by the test suites.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<MemoryTables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a user with a freshly hashed password and returns it.
    pub async fn seed_user(&self, username: &str, password: &str, role: Role) -> Result<User, AppError> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role,
            password_hash: hash_password(password)?,
        };
        self.tables
            .write()
            .await
            .users
            .insert(user.id, user.clone());
        Ok(user)
    }

    /// Appends a record and returns a copy of it.
    pub async fn seed_record(&self, record: Record) -> Record {
        self.tables.write().await.records.push(record.clone());
        record
    }
}

/// Compares two records on a named column. Unknown columns compare equal, which
/// leaves the natural order untouched.
fn compare_on(field: &str, a: &Record, b: &Record) -> Ordering {
    match field {
        "id" => a.id.cmp(&b.id),
        "name" => a.name.cmp(&b.name),
        "category" => a.category.cmp(&b.category),
        "created_at" => a.created_at.cmp(&b.created_at),
        "deleted_by" => a.deleted_by.cmp(&b.deleted_by),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.tables.read().await.users.get(&id).cloned()
    }

    async fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned()
    }

    async fn create_user(&self, user: User) -> Option<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            tracing::error!("create_user error: username {} already taken", user.username);
            return None;
        }
        tables.users.insert(user.id, user.clone());
        Some(user)
    }

    async fn list_records(&self, ordering: Option<String>) -> Vec<Record> {
        let mut records = self.tables.read().await.records.clone();
        if let Some(token) = ordering {
            let (field, descending) = parse_ordering(&token);
            // sort_by is stable, so ties keep insertion order.
            records.sort_by(|a, b| {
                let ord = compare_on(field, a, b);
                if descending { ord.reverse() } else { ord }
            });
        }
        records
    }

    async fn get_record(&self, id: Uuid) -> Option<Record> {
        self.tables
            .read()
            .await
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    async fn create_record(&self, record: Record) -> Option<Record> {
        let mut tables = self.tables.write().await;
        if tables.records.iter().any(|r| r.id == record.id) {
            tracing::error!("create_record error: duplicate id {}", record.id);
            return None;
        }
        tables.records.push(record.clone());
        Some(record)
    }

    async fn save_record(&self, record: &Record) -> bool {
        let mut tables = self.tables.write().await;
        match tables.records.iter_mut().find(|r| r.id == record.id) {
            Some(stored) => {
                *stored = record.clone();
                true
            }
            None => false,
        }
    }
}
