use serde::{Deserialize, Serialize};

use crate::domain::ExtraFields;

/// A buyer-facing evaluation (mutual action plan) tied to an organization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: i64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}
