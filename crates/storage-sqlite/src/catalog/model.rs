//! Database models for the brand/model dictionary.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use clearcost_core::catalog::{Brand, VehicleModel};

/// Database model for a brand. The id is the upstream catalog's, so the
/// same struct inserts and reads.
#[derive(
    Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq,
)]
#[diesel(table_name = crate::schema::car_brands)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CarBrandDB {
    pub id: i32,
    pub name: String,
}

/// Database model for a model row, same id regime as [`CarBrandDB`].
#[derive(
    Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq,
)]
#[diesel(table_name = crate::schema::car_models)]
#[diesel(belongs_to(CarBrandDB, foreign_key = brand_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CarModelDB {
    pub id: i32,
    pub name: String,
    pub brand_id: i32,
}

// Conversions to and from domain models

impl From<CarBrandDB> for Brand {
    fn from(db: CarBrandDB) -> Self {
        Brand {
            id: db.id,
            name: db.name,
        }
    }
}

impl From<CarModelDB> for VehicleModel {
    fn from(db: CarModelDB) -> Self {
        VehicleModel {
            id: db.id,
            name: db.name,
            brand_id: db.brand_id,
        }
    }
}

impl From<VehicleModel> for CarModelDB {
    fn from(domain: VehicleModel) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            brand_id: domain.brand_id,
        }
    }
}
