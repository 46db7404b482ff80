use clearcost_core::history::{CalculationRecord, HistoryRepositoryTrait, NewCalculationRecord};
use clearcost_core::Result;

use super::model::{CalculationRecordDB, NewCalculationRecordDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::calculation_records;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

/// Per-device calculation history. Records are immutable once written;
/// the only mutations are deletes scoped to one record or one device.
pub struct HistoryRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl HistoryRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl HistoryRepositoryTrait for HistoryRepository {
    fn records_for_device(&self, device_id: &str) -> Result<Vec<CalculationRecord>> {
        let mut conn = get_connection(&self.pool)?;

        // RFC 3339 timestamps in TEXT sort chronologically.
        let rows = calculation_records::table
            .filter(calculation_records::device_id.eq(device_id))
            .order_by((
                calculation_records::created_at.desc(),
                calculation_records::id.desc(),
            ))
            .load::<CalculationRecordDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter().map(CalculationRecord::try_from).collect()
    }

    async fn insert(&self, record: NewCalculationRecord) -> Result<CalculationRecord> {
        self.writer
            .exec(move |conn| {
                let new_row = NewCalculationRecordDB::from_domain(record, Utc::now());
                let row = diesel::insert_into(calculation_records::table)
                    .values(&new_row)
                    .returning(CalculationRecordDB::as_returning())
                    .get_result::<CalculationRecordDB>(conn)
                    .map_err(StorageError::from)?;
                CalculationRecord::try_from(row)
            })
            .await
    }

    async fn delete(&self, record_id: i32) -> Result<bool> {
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(calculation_records::table.find(record_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted > 0)
            })
            .await
    }

    async fn clear_device(&self, device_id: &str) -> Result<usize> {
        let device_id = device_id.to_string();
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(
                    calculation_records::table
                        .filter(calculation_records::device_id.eq(device_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}
