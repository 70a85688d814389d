use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use std::time::Duration;
use tracing::debug;

use crate::cache::{CacheEntry, CacheError};
use crate::entities::{job_cache, prelude::*};
use crate::models::{CacheKey, Job, SearchQuery};

pub struct JobCacheRepository {
    conn: DatabaseConnection,
}

impl JobCacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let now = stamp(Utc::now());

        // Opportunistic cleanup, a failure here must not hide a valid entry
        if let Err(e) = JobCache::delete_many()
            .filter(job_cache::Column::ExpiresAt.lte(&now))
            .exec(&self.conn)
            .await
        {
            debug!(error = %e, "Failed to purge expired cache rows");
        }

        // Count first, then read the counted row
        let txn = self.conn.begin().await?;

        let counted = JobCache::update_many()
            .col_expr(
                job_cache::Column::HitCount,
                Expr::col(job_cache::Column::HitCount).add(1),
            )
            .filter(job_cache::Column::CacheKey.eq(key.as_str()))
            .filter(job_cache::Column::ExpiresAt.gt(&now))
            .exec(&txn)
            .await?;

        if counted.rows_affected == 0 {
            return Ok(None);
        }

        let Some(row) = JobCache::find()
            .filter(job_cache::Column::CacheKey.eq(key.as_str()))
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        txn.commit().await?;

        let results: Vec<Job> = serde_json::from_str(&row.results_json)?;

        Ok(Some(CacheEntry {
            results,
            created_at: parse_stamp(&row.created_at)?,
            expires_at: parse_stamp(&row.expires_at)?,
            hit_count: u64::try_from(row.hit_count).unwrap_or(0),
        }))
    }

    pub async fn put(
        &self,
        key: &CacheKey,
        query: &SearchQuery,
        results: &[Job],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry::new(Vec::new(), Utc::now(), ttl);

        let active_model = job_cache::ActiveModel {
            cache_key: Set(key.as_str().to_string()),
            search_params: Set(serde_json::to_string(query)?),
            results_json: Set(serde_json::to_string(results)?),
            created_at: Set(stamp(entry.created_at)),
            expires_at: Set(stamp(entry.expires_at)),
            hit_count: Set(0),
            ..Default::default()
        };

        JobCache::insert(active_model)
            .on_conflict(
                OnConflict::column(job_cache::Column::CacheKey)
                    .update_columns([
                        job_cache::Column::SearchParams,
                        job_cache::Column::ResultsJson,
                        job_cache::Column::CreatedAt,
                        job_cache::Column::ExpiresAt,
                        job_cache::Column::HitCount,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let result = JobCache::delete_many()
            .filter(job_cache::Column::ExpiresAt.lte(stamp(Utc::now())))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Fixed-width UTC timestamps so that string order matches time order.
pub(crate) fn stamp(at: DateTime<Utc>) -> String {
    let ceiling = NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map_or(at, |d| d.and_utc());
    at.min(ceiling).to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_stamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
