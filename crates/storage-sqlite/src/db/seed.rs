//! Brand dictionary seeding.
//!
//! The dictionary ships with a starter set of AutoRia brands so reference
//! resolution works before any model has been materialized. Seeding is
//! additive: ids already present are left untouched, so a dictionary grown
//! at runtime survives restarts and re-seeding.

use diesel::prelude::*;
use log::info;
use serde::Deserialize;

use super::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::car_brands;
use clearcost_core::Result;

const BRANDS_JSON: &str = include_str!("seeds/brands.json");

/// One entry of the embedded brand list, in the AutoRia list-item shape
/// (`value` is the catalog id).
#[derive(Deserialize)]
struct BrandSeed {
    name: String,
    value: i32,
}

/// Inserts any seed brands missing from the dictionary. Returns how many
/// rows were added.
pub fn seed_brands(pool: &DbPool) -> Result<usize> {
    let seeds: Vec<BrandSeed> = serde_json::from_str(BRANDS_JSON)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;

    let mut conn = get_connection(pool)?;

    let mut inserted = 0;
    for seed in &seeds {
        inserted += diesel::insert_into(car_brands::table)
            .values((
                car_brands::id.eq(seed.value),
                car_brands::name.eq(&seed.name),
            ))
            .on_conflict(car_brands::id)
            .do_nothing()
            .execute(&mut conn)
            .map_err(StorageError::from)?;
    }

    info!(
        "Brand dictionary seeded: {} new of {} shipped",
        inserted,
        seeds.len()
    );
    Ok(inserted)
}
