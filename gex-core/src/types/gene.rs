use serde::{Deserialize, Serialize};

/// Biological gene record behind a probe.
///
/// `gene_id` is the primary external accession; the cross-reference ids are
/// optional because not every annotation release carries all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GexGene {
    #[serde(skip)]
    pub id: i64,
    pub public_id: String,
    pub gene_id: String,
    pub gene_symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensembl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refseq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncbi: Option<String>,
}

/// A measurement unit on one (genome, technology) platform.
///
/// For RNA-seq the probe name equals the gene symbol; for microarray it is
/// the probeset id (e.g. `1007_s_at`). Every probe references exactly one
/// gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(skip)]
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub gene: GexGene,
}
