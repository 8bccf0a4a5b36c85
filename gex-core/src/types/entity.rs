use serde::{Deserialize, Serialize};

/// A named catalog object with a stable public identifier.
///
/// Genomes, technologies and expression types are all plain entities: the
/// internal key addresses catalog rows, the public id is what clients see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Internal catalog key, never serialized
    #[serde(skip)]
    pub id: i64,
    pub public_id: String,
    pub name: String,
}

impl Entity {
    pub fn new(id: i64, public_id: impl Into<String>, name: impl Into<String>) -> Self {
        Entity {
            id,
            public_id: public_id.into(),
            name: name.into(),
        }
    }
}
