use crate::model::types::GeneId;
use serde::{Serialize, Deserialize};

/// Gene model: the stable gene key written to output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub id: GeneId,
    pub key: String,
}

impl Gene {
    pub fn new(id: GeneId, key: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
        }
    }
}

