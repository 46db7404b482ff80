use clearcost_core::catalog::{Brand, CatalogRepositoryTrait, VehicleModel};
use clearcost_core::Result;

use super::model::{CarBrandDB, CarModelDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{car_brands, car_models};
use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

/// Dictionary store. Ids come from the upstream catalog; inserting a model
/// id that already exists is a no-op so two requests materializing the same
/// model cannot conflict.
pub struct CatalogRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CatalogRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CatalogRepositoryTrait for CatalogRepository {
    fn brands(&self) -> Result<Vec<Brand>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = car_brands::table
            .order_by(car_brands::name.asc())
            .load::<CarBrandDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(Brand::from).collect())
    }

    fn brand_exists(&self, brand_id: i32) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        let count: i64 = car_brands::table
            .filter(car_brands::id.eq(brand_id))
            .select(count_star())
            .first(&mut conn)
            .map_err(StorageError::from)?;

        Ok(count > 0)
    }

    fn models_of_brand(&self, brand_id: i32) -> Result<Vec<VehicleModel>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = car_models::table
            .filter(car_models::brand_id.eq(brand_id))
            .order_by(car_models::name.asc())
            .load::<CarModelDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(VehicleModel::from).collect())
    }

    fn model_exists(&self, model_id: i32) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        let count: i64 = car_models::table
            .filter(car_models::id.eq(model_id))
            .select(count_star())
            .first(&mut conn)
            .map_err(StorageError::from)?;

        Ok(count > 0)
    }

    async fn insert_model(&self, model: VehicleModel) -> Result<VehicleModel> {
        self.writer
            .exec(move |conn| {
                let new_row = CarModelDB::from(model);
                diesel::insert_into(car_models::table)
                    .values(&new_row)
                    .on_conflict(car_models::id)
                    .do_nothing()
                    .execute(conn)
                    .map_err(StorageError::from)?;

                // A lost race means the row already exists; read back
                // whichever version won.
                let row = car_models::table
                    .find(new_row.id)
                    .first::<CarModelDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(VehicleModel::from(row))
            })
            .await
    }
}
