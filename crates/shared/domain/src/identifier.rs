//! Identifier handling.
//!
//! Identifiers (user, team, department, project, report) are opaque strings.
//! They are non-empty once surrounding whitespace is stripped and are never a
//! relative path segment, since each one ends up as a single URL path segment.

use crate::error::{DomainError, DomainResult};

/// Trim an identifier and reject it if nothing is left or if it is `.`/`..`.
pub fn normalize_id(raw: &str) -> DomainResult<&str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(DomainError::validation("identifier must not be empty"));
    }
    if id == "." || id == ".." {
        return Err(DomainError::validation(format!("invalid identifier: {:?}", id)));
    }
    Ok(id)
}
