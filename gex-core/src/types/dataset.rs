use serde::{Deserialize, Serialize};

use super::Entity;

/// Capacity hint for sample lists; the largest known dataset is around 500
/// samples.
pub const DEFAULT_NUM_SAMPLES: usize = 500;

/// One metadata item attached to a sample, e.g. `(stage, III)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedValue {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One biological replicate in a dataset.
///
/// Metadata keeps the catalog's insertion order: display groupings such as
/// N/GC/M are curated, not alphabetical, so the order is never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    #[serde(skip)]
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub metadata: Vec<NamedValue>,
}

/// Dataset header without samples, used where the full tree is not needed
/// (search results, permission checks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicDataset {
    #[serde(skip)]
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub platform: String,
    pub institution: String,
}

/// A cohort of samples measured on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip)]
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub platform: String,
    pub institution: String,
    pub genome: Entity,
    pub technology: Entity,
    pub samples: Vec<Sample>,
    pub expr_types: Vec<Entity>,
}
