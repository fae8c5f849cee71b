//! 24-hex-character record identifiers.
//!
//! Layout: 4-byte big-endian unix seconds followed by 8 random bytes, so ids
//! sort roughly by creation time.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, FieldError, Result};

pub const ID_LEN: usize = 24;

pub fn new_id() -> String {
    let secs = Utc::now().timestamp() as u32;
    let random = Uuid::new_v4();
    let mut id = format!("{secs:08x}");
    for byte in &random.as_bytes()[..8] {
        id.push_str(&format!("{byte:02x}"));
    }
    id
}

pub fn is_valid(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Rejects malformed ids before they reach a query. Stored ids are
/// lowercase, so the accepted id comes back lowercased.
pub fn validate(id: &str, what: &str) -> Result<String> {
    if is_valid(id) {
        Ok(id.to_ascii_lowercase())
    } else {
        Err(AppError::Validation(format!("Invalid {what} id format")))
    }
}

/// Batch form of [`validate`]: every malformed entry is reported by index.
pub fn validate_all(field: &str, ids: &[String]) -> Result<Vec<String>> {
    let invalid: Vec<FieldError> = ids
        .iter()
        .enumerate()
        .filter(|(_, id)| !is_valid(id))
        .map(|(i, _)| FieldError::new(&format!("{field}[{i}]"), "must be a 24-character hex id"))
        .collect();
    if !invalid.is_empty() {
        return Err(AppError::InvalidFields(invalid));
    }
    Ok(ids.iter().map(|id| id.to_ascii_lowercase()).collect())
}
