use serde::{Deserialize, Serialize};

/// A vehicle brand known to the local dictionary.
///
/// Ids are the upstream catalog's, never locally generated; the dictionary
/// only mirrors the subset of the catalog that calculations have touched or
/// seeding shipped.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: i32,
    pub name: String,
}

/// A vehicle model under a brand, same id regime as [`Brand`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleModel {
    pub id: i32,
    pub name: String,
    pub brand_id: i32,
}
