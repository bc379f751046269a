use super::{map_write_error, RepositoryError, RepositoryResult};
use crate::models::entry::{EntryFilter, EntryStatus, EntryType, FinancialEntry, NewEntry};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

const ENTRY_COLUMNS: &str =
    "id, description, month, year, value, entry_type, status, user_id, created_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait EntryRepository: Send + Sync {
    async fn insert(
        &self,
        entry: &NewEntry,
        status: EntryStatus,
    ) -> RepositoryResult<FinancialEntry>;
    /// `status: None` keeps the stored status.
    async fn update(
        &self,
        id: i64,
        entry: &NewEntry,
        status: Option<EntryStatus>,
    ) -> RepositoryResult<FinancialEntry>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<FinancialEntry>>;
    async fn search(&self, filter: &EntryFilter) -> RepositoryResult<Vec<FinancialEntry>>;
}

#[derive(Debug, FromRow)]
struct EntryRow {
    id: i64,
    description: String,
    month: i64,
    year: i64,
    value: String,
    entry_type: String,
    status: String,
    user_id: i64,
    created_at: Option<String>,
}

impl TryFrom<EntryRow> for FinancialEntry {
    type Error = RepositoryError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let malformed = |e: &dyn std::fmt::Display| {
            RepositoryError::MalformedRow(format!("entry {}: {}", row.id, e))
        };

        let value = Decimal::from_str(&row.value).map_err(|e| malformed(&e))?;
        let entry_type = row.entry_type.parse::<EntryType>().map_err(|e| malformed(&e))?;
        let status = row.status.parse::<EntryStatus>().map_err(|e| malformed(&e))?;

        Ok(FinancialEntry {
            id: Some(row.id),
            description: Some(row.description),
            month: Some(row.month),
            year: Some(row.year),
            value: Some(value),
            entry_type: Some(entry_type),
            status: Some(status),
            user_id: Some(row.user_id),
            created_at: row.created_at,
        })
    }
}

pub struct SqliteEntryRepository {
    pool: SqlitePool,
}

impl SqliteEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryRepository for SqliteEntryRepository {
    async fn insert(
        &self,
        entry: &NewEntry,
        status: EntryStatus,
    ) -> RepositoryResult<FinancialEntry> {
        let result = sqlx::query(
            r#"
            INSERT INTO entries (description, month, year, value, entry_type, status, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.description)
        .bind(entry.month)
        .bind(entry.year)
        .bind(entry.value.to_string())
        .bind(entry.entry_type.as_str())
        .bind(status.as_str())
        .bind(entry.user_id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn update(
        &self,
        id: i64,
        entry: &NewEntry,
        status: Option<EntryStatus>,
    ) -> RepositoryResult<FinancialEntry> {
        let result = sqlx::query(
            r#"
            UPDATE entries
            SET description = ?, month = ?, year = ?, value = ?, entry_type = ?,
                user_id = ?, status = COALESCE(?, status)
            WHERE id = ?
            "#,
        )
        .bind(&entry.description)
        .bind(entry.month)
        .bind(entry.year)
        .bind(entry.value.to_string())
        .bind(entry.entry_type.as_str())
        .bind(entry.user_id)
        .bind(status.map(|s| s.as_str()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<FinancialEntry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?");
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(FinancialEntry::try_from).transpose()
    }

    async fn search(&self, filter: &EntryFilter) -> RepositoryResult<Vec<FinancialEntry>> {
        let mut query = build_search_query(filter);
        let rows = query
            .build_query_as::<EntryRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = FinancialEntry::try_from(row)?;
            if filter.matches(&entry) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

/// Renders the exact-match part of the filter as a parameterised SELECT.
/// The description is matched afterwards by [`EntryFilter::matches`], since
/// SQLite's `lower` only folds ASCII.
fn build_search_query(filter: &EntryFilter) -> QueryBuilder<'_, Sqlite> {
    let mut query =
        QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = "));
    query.push_bind(filter.user_id);

    if let Some(month) = filter.month {
        query.push(" AND month = ").push_bind(month);
    }
    if let Some(year) = filter.year {
        query.push(" AND year = ").push_bind(year);
    }
    if let Some(entry_type) = filter.entry_type {
        query.push(" AND entry_type = ").push_bind(entry_type.as_str());
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }

    query.push(" ORDER BY year, month, id");
    query
}
