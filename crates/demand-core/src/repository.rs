//! Durable store for the cleaned daily series, keyed by date.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::Row;
use thiserror::Error;
use tracing::info;

use crate::db::DbPool;
use crate::series::{DailyPoint, DailySeries};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored date '{0}' is not a valid YYYY-MM-DD date")]
    InvalidDate(String),
}

/// How `append` treats dates that are already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Keep stored rows; incoming rows with an existing date are skipped.
    SkipDuplicates,
    /// Delete every stored row inside the incoming [first, last] range, then insert.
    ReplaceOverlap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppendReport {
    pub inserted: u64,
    pub skipped: u64,
    pub replaced: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub count: i64,
    pub last_date: Option<NaiveDate>,
}

#[async_trait]
pub trait DemandStore: Send + Sync {
    async fn initialize(&self) -> Result<(), RepositoryError>;
    async fn append(
        &self,
        series: &DailySeries,
        mode: WriteMode,
    ) -> Result<AppendReport, RepositoryError>;
    async fn load_all(&self) -> Result<DailySeries, RepositoryError>;
    async fn clear_all(&self) -> Result<u64, RepositoryError>;
    async fn stats(&self) -> Result<StoreStats, RepositoryError>;
}

#[derive(Clone)]
pub struct SqliteDemandStore {
    pool: DbPool,
}

impl SqliteDemandStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| RepositoryError::InvalidDate(raw.to_string()))
}

#[async_trait]
impl DemandStore for SqliteDemandStore {
    async fn initialize(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS daily_demand (
                date TEXT PRIMARY KEY NOT NULL,
                value REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn append(
        &self,
        series: &DailySeries,
        mode: WriteMode,
    ) -> Result<AppendReport, RepositoryError> {
        let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
            return Ok(AppendReport::default());
        };

        let mut report = AppendReport::default();
        let mut tx = self.pool.begin().await?;

        if mode == WriteMode::ReplaceOverlap {
            let deleted = sqlx::query("DELETE FROM daily_demand WHERE date BETWEEN ? AND ?")
                .bind(format_date(first))
                .bind(format_date(last))
                .execute(&mut *tx)
                .await?;
            report.replaced = deleted.rows_affected();
        }

        for point in &series.points {
            let result = sqlx::query("INSERT OR IGNORE INTO daily_demand (date, value) VALUES (?, ?)")
                .bind(format_date(point.date))
                .bind(point.value)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                report.skipped += 1;
            } else {
                report.inserted += 1;
            }
        }

        tx.commit().await?;

        info!(
            ?mode,
            first = %first,
            last = %last,
            inserted = report.inserted,
            skipped = report.skipped,
            replaced = report.replaced,
            "daily series stored"
        );

        Ok(report)
    }

    async fn load_all(&self) -> Result<DailySeries, RepositoryError> {
        let rows = sqlx::query("SELECT date, value FROM daily_demand ORDER BY date ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            let raw_date: String = row.try_get("date")?;
            points.push(DailyPoint {
                date: parse_date(&raw_date)?,
                value: row.try_get("value")?,
            });
        }

        Ok(DailySeries::new(points))
    }

    async fn clear_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM daily_demand")
            .execute(&self.pool)
            .await?;
        info!(deleted = result.rows_affected(), "daily store cleared");
        Ok(result.rows_affected())
    }

    async fn stats(&self) -> Result<StoreStats, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count, MAX(date) AS last_date FROM daily_demand")
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("count")?;
        let last_date: Option<String> = row.try_get("last_date")?;

        Ok(StoreStats {
            count,
            last_date: last_date.as_deref().map(parse_date).transpose()?,
        })
    }
}
