//! Opine API records.
//!
//! The remote schemas drift between API versions, so records type only their
//! id and the foreign keys this workspace follows. Everything else stays in a
//! flattened map of raw JSON values and is re-emitted unchanged, so explicit
//! `null`s stay `null` and integers stay integers.

pub mod deal;
pub mod evaluation;
pub mod note;
pub mod page;
pub mod sales_process;
pub mod ticket;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fields a record carries beyond the typed ones.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// Decodes a field that may be absent, `null`, or set, into
/// `None`, `Some(None)` and `Some(Some(_))` respectively. Pair it with
/// `#[serde(default)]` and `skip_serializing_if = "Option::is_none"` so the
/// field is written back exactly as it arrived.
pub(crate) mod nullable {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// A reference to another record. Opine uses numeric ids for most records
/// but string ids (including `eid:` addresses) for deals.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordRef {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}
