use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ExtraFields;

/// One page of a list endpoint. `limit`, `offset` and `totalCount` are kept
/// as the server sent them, or left out if it sent none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl<T> Page<T> {
    pub fn total_count(&self) -> Option<u64> {
        self.extra.get("totalCount").and_then(Value::as_u64)
    }

    pub fn offset(&self) -> u64 {
        self.extra.get("offset").and_then(Value::as_u64).unwrap_or(0)
    }

    /// Whether the server reported more records past this page.
    pub fn has_more(&self) -> bool {
        self.total_count()
            .is_some_and(|total| self.offset().saturating_add(self.items.len() as u64) < total)
    }
}
