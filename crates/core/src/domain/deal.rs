use serde::{Deserialize, Serialize};

use crate::domain::{nullable, ExtraFields};
use crate::errors::IdError;
use crate::salesforce;

/// A deal. Only the id and the sales process references are typed; the
/// remaining fields (name, amount, stage, dates, summary, ...) pass through
/// in `extra` as the API sent them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    #[serde(
        default,
        deserialize_with = "nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub sales_process_id: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub sales_process_stage_id: Option<Option<i64>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Deal {
    /// The referenced sales process, if the deal names one.
    pub fn sales_process_key(&self) -> Option<i64> {
        self.sales_process_id.flatten()
    }

    pub fn sales_process_stage_key(&self) -> Option<i64> {
        self.sales_process_stage_id.flatten()
    }
}

/// How a caller names the deal to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DealSelector {
    /// An Opine id, or an address the caller already prefixed with `eid:`.
    Native(String),
    /// A raw 15- or 18-character Salesforce id.
    Salesforce(String),
}

impl DealSelector {
    pub fn new(id: impl Into<String>, is_salesforce_id: bool) -> Self {
        let id = id.into();
        if is_salesforce_id {
            Self::Salesforce(id)
        } else {
            Self::Native(id)
        }
    }

    /// The id the Opine API expects in the deal path.
    pub fn resolve(&self) -> Result<String, IdError> {
        match self {
            Self::Native(id) => Ok(id.clone()),
            Self::Salesforce(id) => salesforce::external_deal_id(id),
        }
    }
}
