use serde::{Deserialize, Serialize};

use super::{BasicDataset, Entity, Probe};

/// Expression vector for one probe; `values[i]` belongs to sample `i` of
/// the dataset the enclosing results were built for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeValues {
    pub probe: Probe,
    pub values: Vec<f32>,
}

/// Result of one expression search over a single dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub dataset: BasicDataset,
    pub expr_type: Entity,
    pub probes: Vec<ProbeValues>,
}
