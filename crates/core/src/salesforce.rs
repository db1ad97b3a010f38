//! Salesforce record identifier helpers.
//!
//! Salesforce issues 15-character, case-sensitive ids. The 18-character form
//! appends a checksum derived from the letter casing so the id survives
//! case-insensitive systems. Opine addresses deals synced from Salesforce as
//! `eid:<18-char id>`.

use crate::errors::IdError;

pub const SHORT_ID_LEN: usize = 15;
pub const CASE_SAFE_ID_LEN: usize = 18;
pub const EXTERNAL_ID_PREFIX: &str = "eid:";

const CHUNK_LEN: usize = 5;
const CHECKSUM_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";

/// Converts a 15-character id to its 18-character case-safe form.
///
/// Each group of five characters contributes one suffix character: bit `j`
/// of the group value is set when the `j`-th character is an ASCII uppercase
/// letter, and the value indexes into `A..Z0..5`.
pub fn convert_15_to_18(id: &str) -> Result<String, IdError> {
    let chars: Vec<char> = id.chars().collect();
    if chars.is_empty() {
        return Err(IdError::EmptyInput);
    }
    if chars.len() != SHORT_ID_LEN {
        return Err(IdError::InvalidLength { expected: "15", actual: chars.len() });
    }

    let mut case_safe = String::with_capacity(id.len() + 3);
    case_safe.push_str(id);
    for chunk in chars.chunks(CHUNK_LEN) {
        let flags = chunk
            .iter()
            .enumerate()
            .filter(|(_, ch)| ch.is_ascii_uppercase())
            .fold(0usize, |flags, (bit, _)| flags | (1 << bit));
        case_safe.push(char::from(CHECKSUM_ALPHABET[flags]));
    }

    Ok(case_safe)
}

/// Normalizes a 15- or 18-character id to the 18-character form.
///
/// 18-character input is returned as-is; its checksum is not verified.
pub fn ensure_id18(id: &str) -> Result<String, IdError> {
    if id.is_empty() {
        return Err(IdError::EmptyInput);
    }

    match id.chars().count() {
        CASE_SAFE_ID_LEN => Ok(id.to_string()),
        SHORT_ID_LEN => convert_15_to_18(id),
        actual => Err(IdError::InvalidLength { expected: "15 or 18", actual }),
    }
}

/// Builds the Opine deal address for a Salesforce id.
pub fn external_deal_id(salesforce_id: &str) -> Result<String, IdError> {
    let id18 = ensure_id18(salesforce_id)?;
    Ok(format!("{EXTERNAL_ID_PREFIX}{id18}"))
}
