use serde::{Deserialize, Serialize};

use crate::domain::ExtraFields;

/// A note on a deal. Title and body (rich-text nodes or markdown) are passed
/// through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}
