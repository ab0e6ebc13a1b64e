//! Profile records as served by the profile service.

use serde::{Deserialize, Serialize};

/// A user profile.
///
/// Every attribute except `id` is nullable: `None` means the profile service
/// did not provide it, which is not the same as an empty string. A record
/// decoded from `{}` is the zero value (see [`UserDetail::is_zero`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserDetail {
    /// User identifier
    #[serde(default)]
    pub id: String,
    /// Display name
    pub display_name: Option<String>,
    /// Role (e.g. "Staff", "Manager", "Director")
    pub role: Option<String>,
    /// Team the user belongs to
    pub team_id: Option<String>,
    /// Department the user belongs to
    pub department_id: Option<String>,
    /// Team name, flattened by the profile service
    pub team_name: Option<String>,
    /// Department name, flattened by the profile service
    pub department_name: Option<String>,
}

impl UserDetail {
    /// Record with only the identifier set.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// True for the zero value (empty id, no attributes).
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// A team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Team {
    #[serde(default)]
    pub id: String,
    pub name: Option<String>,
    pub department_id: Option<String>,
}

/// A department.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Department {
    #[serde(default)]
    pub id: String,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_decodes_to_zero_value() {
        let user: UserDetail = serde_json::from_str("{}").unwrap();
        assert!(user.is_zero());
    }

    #[test]
    fn test_null_and_empty_string_are_distinct() {
        let user: UserDetail =
            serde_json::from_str(r#"{"id":"u1","display_name":"","role":null}"#).unwrap();
        assert_eq!(user.display_name.as_deref(), Some(""));
        assert_eq!(user.role, None);
        assert!(!user.is_zero());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let user: UserDetail = serde_json::from_str(
            r#"{"id":"u1","display_name":"Ann","created_at":"2024-01-01","team_name":"Ops"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.team_name.as_deref(), Some("Ops"));
    }
}
