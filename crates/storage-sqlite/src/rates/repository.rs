use clearcost_core::rates::{ExchangeRate, NewExchangeRate, RateRepositoryTrait};
use clearcost_core::Result;

use super::model::{CurrencyRateDB, NewCurrencyRateDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::currency_rates;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

/// Append-only rate store. Rows are never updated; the newest row for a
/// (currency, date) pair wins, so a re-fetch after an upstream correction
/// simply shadows the old value.
pub struct RateRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl RateRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl RateRepositoryTrait for RateRepository {
    fn get_rate_for_date(
        &self,
        currency_code: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        let row = currency_rates::table
            .filter(currency_rates::currency_code.eq(currency_code))
            .filter(currency_rates::effective_date.eq(date.format("%Y-%m-%d").to_string()))
            .order_by(currency_rates::id.desc())
            .first::<CurrencyRateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(ExchangeRate::from))
    }

    fn get_latest_rate(&self, currency_code: &str) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        // ISO dates in TEXT sort chronologically.
        let row = currency_rates::table
            .filter(currency_rates::currency_code.eq(currency_code))
            .order_by((
                currency_rates::effective_date.desc(),
                currency_rates::id.desc(),
            ))
            .first::<CurrencyRateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(ExchangeRate::from))
    }

    async fn save_rate(&self, rate: NewExchangeRate) -> Result<ExchangeRate> {
        self.writer
            .exec(move |conn| {
                let new_row = NewCurrencyRateDB::from(rate);
                let row = diesel::insert_into(currency_rates::table)
                    .values(&new_row)
                    .returning(CurrencyRateDB::as_returning())
                    .get_result::<CurrencyRateDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(ExchangeRate::from(row))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (
        RateRepository,
        Arc<Pool<ConnectionManager<SqliteConnection>>>,
        tempfile::TempDir,
    ) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");

        let writer = spawn_writer((*pool).clone());
        let repo = RateRepository::new(Arc::clone(&pool), writer);
        (repo, pool, temp_dir)
    }

    fn rate_row(code: &str, rate: rust_decimal::Decimal, date: &str) -> NewExchangeRate {
        NewExchangeRate {
            currency_code: code.to_string(),
            rate,
            effective_date: date.parse().expect("valid date literal"),
        }
    }

    #[tokio::test]
    async fn test_saved_rate_round_trips_with_scale() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;

        let saved = repo
            .save_rate(rate_row("EUR", dec!(48.1234), "2026-06-15"))
            .await
            .expect("save failed");
        assert!(saved.id > 0);

        let loaded = repo
            .get_rate_for_date("EUR", "2026-06-15".parse().unwrap())
            .expect("lookup failed")
            .expect("row should exist");
        assert_eq!(loaded.rate, dec!(48.1234));
        assert_eq!(loaded.currency_code, "EUR");
    }

    #[tokio::test]
    async fn test_lookup_is_scoped_to_currency_and_date() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;

        repo.save_rate(rate_row("EUR", dec!(48.0), "2026-06-15"))
            .await
            .expect("save failed");

        assert!(repo
            .get_rate_for_date("USD", "2026-06-15".parse().unwrap())
            .expect("lookup failed")
            .is_none());
        assert!(repo
            .get_rate_for_date("EUR", "2026-06-16".parse().unwrap())
            .expect("lookup failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_latest_rate_prefers_newest_date() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;

        repo.save_rate(rate_row("USD", dec!(40.5), "2026-06-10"))
            .await
            .expect("save failed");
        repo.save_rate(rate_row("USD", dec!(41.2), "2026-06-14"))
            .await
            .expect("save failed");
        repo.save_rate(rate_row("EUR", dec!(48.9), "2026-06-20"))
            .await
            .expect("save failed");

        let latest = repo
            .get_latest_rate("USD")
            .expect("lookup failed")
            .expect("row should exist");
        assert_eq!(latest.rate, dec!(41.2));
        assert_eq!(latest.effective_date, "2026-06-14".parse().unwrap());
    }

    #[tokio::test]
    async fn test_newest_row_shadows_same_day_duplicate() {
        let (repo, _pool, _temp_dir) = create_test_repository().await;

        repo.save_rate(rate_row("EUR", dec!(48.0), "2026-06-15"))
            .await
            .expect("save failed");
        repo.save_rate(rate_row("EUR", dec!(48.5), "2026-06-15"))
            .await
            .expect("save failed");

        let row = repo
            .get_rate_for_date("EUR", "2026-06-15".parse().unwrap())
            .expect("lookup failed")
            .expect("row should exist");
        assert_eq!(row.rate, dec!(48.5));
    }
}
