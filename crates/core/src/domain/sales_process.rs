use serde::{Deserialize, Serialize};

use crate::domain::ExtraFields;

/// Records that are looked up by their numeric id.
pub trait Keyed {
    fn key(&self) -> i64;
}

/// Returns the first record whose id equals `key`.
///
/// Ids are not assumed unique; later duplicates are ignored.
pub fn find_by_key<T: Keyed>(records: impl IntoIterator<Item = T>, key: i64) -> Option<T> {
    records.into_iter().find(|record| record.key() == key)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesProcess {
    pub id: i64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A stage of a sales process. Deleted stages carry `deletedAt` in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesProcessStage {
    pub id: i64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Keyed for SalesProcess {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for SalesProcessStage {
    fn key(&self) -> i64 {
        self.id
    }
}
