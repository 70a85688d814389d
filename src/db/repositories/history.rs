use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

use super::cache::{parse_stamp, stamp};
use crate::cache::{CacheError, SearchHistoryRecord};
use crate::entities::{prelude::*, search_history};

pub struct SearchHistoryRepository {
    conn: DatabaseConnection,
}

impl SearchHistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, record: &SearchHistoryRecord) -> Result<i64, CacheError> {
        let active_model = search_history::ActiveModel {
            title: Set(record.title.clone()),
            location: Set(record.location.clone()),
            platform: Set(record.platform.clone()),
            results_count: Set(i64::try_from(record.results_count).unwrap_or(i64::MAX)),
            searched_at: Set(stamp(record.searched_at)),
            ..Default::default()
        };

        let result = SearchHistory::insert(active_model)
            .exec(&self.conn)
            .await?;
        Ok(result.last_insert_id)
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<SearchHistoryRecord>, CacheError> {
        let rows = SearchHistory::find()
            .order_by_desc(search_history::Column::SearchedAt)
            .order_by_desc(search_history::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SearchHistoryRecord {
                    title: row.title,
                    location: row.location,
                    platform: row.platform,
                    results_count: usize::try_from(row.results_count).unwrap_or(0),
                    searched_at: parse_stamp(&row.searched_at)?,
                })
            })
            .collect()
    }
}
