//! Report scopes, date windows and the broker envelope.

use chrono::{Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DATE_FORMAT, DEFAULT_WINDOW_MONTHS, EVENT_DEPARTMENT_REPORT_REQUESTED,
    EVENT_ORGANISATION_REPORT_REQUESTED, EVENT_PROJECT_REPORT_REQUESTED, EVENT_REPORT_REQUESTED,
    EVENT_TEAM_REPORT_REQUESTED, ORGANISATION_PARTITION_KEY,
};
use crate::error::DomainResult;
use crate::identifier::normalize_id;

// =============================================================================
// Scope
// =============================================================================

/// Aggregation level of a report request.
///
/// Scope identifiers are trimmed and checked for emptiness on construction,
/// so a `ReportScope` is always safe to interpolate into a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    Personal { user_id: String },
    Team { team_id: String },
    Department { department_id: String },
    Project { project_id: String },
    Organisation,
}

impl ReportScope {
    pub fn personal(user_id: &str) -> DomainResult<Self> {
        Ok(ReportScope::Personal {
            user_id: normalize_id(user_id)?.to_string(),
        })
    }

    pub fn team(team_id: &str) -> DomainResult<Self> {
        Ok(ReportScope::Team {
            team_id: normalize_id(team_id)?.to_string(),
        })
    }

    pub fn department(department_id: &str) -> DomainResult<Self> {
        Ok(ReportScope::Department {
            department_id: normalize_id(department_id)?.to_string(),
        })
    }

    pub fn project(project_id: &str) -> DomainResult<Self> {
        Ok(ReportScope::Project {
            project_id: normalize_id(project_id)?.to_string(),
        })
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ReportScope::Personal { .. } => "personal",
            ReportScope::Team { .. } => "team",
            ReportScope::Department { .. } => "department",
            ReportScope::Project { .. } => "project",
            ReportScope::Organisation => "organisation",
        }
    }

    /// Event kind tag carried by the envelope.
    pub fn event_kind(&self) -> &'static str {
        match self {
            ReportScope::Personal { .. } => EVENT_REPORT_REQUESTED,
            ReportScope::Team { .. } => EVENT_TEAM_REPORT_REQUESTED,
            ReportScope::Department { .. } => EVENT_DEPARTMENT_REPORT_REQUESTED,
            ReportScope::Project { .. } => EVENT_PROJECT_REPORT_REQUESTED,
            ReportScope::Organisation => EVENT_ORGANISATION_REPORT_REQUESTED,
        }
    }

    /// Broker partition key: the scope identifier.
    pub fn partition_key(&self) -> &str {
        match self {
            ReportScope::Personal { user_id } => user_id,
            ReportScope::Team { team_id } => team_id,
            ReportScope::Department { department_id } => department_id,
            ReportScope::Project { project_id } => project_id,
            ReportScope::Organisation => ORGANISATION_PARTITION_KEY,
        }
    }

    /// Path segments of the report service endpoint, relative to its base URL.
    ///
    /// The scope identifier is always a single segment; clients must encode it
    /// as one rather than splicing it into a path string.
    pub fn downstream_segments(&self) -> Vec<&str> {
        match self {
            ReportScope::Personal { user_id } => vec!["report", user_id.as_str()],
            ReportScope::Team { team_id } => vec!["report", "team", team_id.as_str()],
            ReportScope::Department { department_id } => {
                vec!["report", "department", department_id.as_str()]
            }
            ReportScope::Project { project_id } => vec!["report", "project", project_id.as_str()],
            ReportScope::Organisation => vec!["report", "organisation"],
        }
    }

    /// Slash-joined segments, unencoded. For logs only.
    pub fn downstream_path(&self) -> String {
        self.downstream_segments().join("/")
    }
}

// =============================================================================
// Date Window
// =============================================================================

/// Inclusive report window, both ends formatted `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    #[cfg_attr(feature = "openapi", schema(example = "2024-01-01"))]
    pub start_date: String,
    #[cfg_attr(feature = "openapi", schema(example = "2024-12-31"))]
    pub end_date: String,
}

impl DateWindow {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Window ending on `today` and starting one calendar year earlier.
    ///
    /// February 29th maps to February 28th of the previous year.
    pub fn trailing_year(today: NaiveDate) -> Self {
        let start = today
            .checked_sub_months(Months::new(DEFAULT_WINDOW_MONTHS))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start_date: start.format(DATE_FORMAT).to_string(),
            end_date: today.format(DATE_FORMAT).to_string(),
        }
    }

    /// [`DateWindow::trailing_year`] anchored on the local date.
    pub fn trailing_year_from_today() -> Self {
        Self::trailing_year(Local::now().date_naive())
    }
}

// =============================================================================
// Broker Envelope
// =============================================================================

/// Scope-specific event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    #[serde(rename_all = "camelCase")]
    Personal {
        user_id: String,
        start_date: String,
        end_date: String,
    },
    #[serde(rename_all = "camelCase")]
    Team {
        team_id: String,
        start_date: String,
        end_date: String,
    },
    #[serde(rename_all = "camelCase")]
    Department {
        department_id: String,
        start_date: String,
        end_date: String,
    },
    #[serde(rename_all = "camelCase")]
    Project {
        project_id: String,
        start_date: String,
        end_date: String,
    },
    #[serde(rename_all = "camelCase")]
    Organisation {
        start_date: String,
        end_date: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
}

/// Event published before a report is generated.
///
/// Fields are private: once built, an envelope cannot be altered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEnvelope {
    event: String,
    correlation_id: String,
    payload: EventPayload,
}

impl GenerationEnvelope {
    /// Build the envelope for `scope`.
    ///
    /// `requested_by` is only recorded for organisation-wide requests, where
    /// there is no scope identifier to attribute the request to.
    pub fn new(
        scope: &ReportScope,
        window: &DateWindow,
        correlation_id: impl Into<String>,
        requested_by: Option<String>,
    ) -> Self {
        let start_date = window.start_date.clone();
        let end_date = window.end_date.clone();
        let payload = match scope {
            ReportScope::Personal { user_id } => EventPayload::Personal {
                user_id: user_id.clone(),
                start_date,
                end_date,
            },
            ReportScope::Team { team_id } => EventPayload::Team {
                team_id: team_id.clone(),
                start_date,
                end_date,
            },
            ReportScope::Department { department_id } => EventPayload::Department {
                department_id: department_id.clone(),
                start_date,
                end_date,
            },
            ReportScope::Project { project_id } => EventPayload::Project {
                project_id: project_id.clone(),
                start_date,
                end_date,
            },
            ReportScope::Organisation => EventPayload::Organisation {
                start_date,
                end_date,
                user_id: requested_by,
            },
        };

        Self {
            event: scope.event_kind().to_string(),
            correlation_id: correlation_id.into(),
            payload,
        }
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }
}

// =============================================================================
// Report Service Response
// =============================================================================

/// Body returned by the report service's generate endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct ReportServiceResponse {
    pub success: bool,
    pub data: ReportData,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub error: Option<serde_json::Value>,
}

/// Generated report metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct ReportData {
    pub report_url: String,
    pub report_title: String,
    pub task_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trailing_year_is_one_calendar_year() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let window = DateWindow::trailing_year(today);
        assert_eq!(window.start_date, "2023-06-15");
        assert_eq!(window.end_date, "2024-06-15");
    }

    #[test]
    fn test_trailing_year_on_leap_day() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let window = DateWindow::trailing_year(today);
        assert_eq!(window.start_date, "2023-02-28");
    }

    #[test]
    fn test_trailing_year_from_today_ends_today() {
        let window = DateWindow::trailing_year_from_today();
        let end = NaiveDate::parse_from_str(&window.end_date, DATE_FORMAT).unwrap();
        let start = NaiveDate::parse_from_str(&window.start_date, DATE_FORMAT).unwrap();
        assert_eq!(start, end.checked_sub_months(Months::new(12)).unwrap());
    }

    #[test]
    fn test_scope_rejects_blank_id() {
        assert!(ReportScope::team("  ").is_err());
        assert_eq!(
            ReportScope::project(" p-1 ").unwrap(),
            ReportScope::Project {
                project_id: "p-1".to_string()
            }
        );
    }

    #[test]
    fn test_scope_id_stays_one_segment() {
        let scope = ReportScope::personal("u1/../team/x").unwrap();
        assert_eq!(scope.downstream_segments(), vec!["report", "u1/../team/x"]);
    }

    #[test]
    fn test_scope_routing() {
        let dept = ReportScope::department("d1").unwrap();
        assert_eq!(dept.downstream_path(), "report/department/d1");
        assert_eq!(dept.partition_key(), "d1");
        assert_eq!(dept.event_kind(), EVENT_DEPARTMENT_REPORT_REQUESTED);

        let org = ReportScope::Organisation;
        assert_eq!(org.downstream_segments(), vec!["report", "organisation"]);
        assert_eq!(org.partition_key(), ORGANISATION_PARTITION_KEY);
    }

    #[test]
    fn test_personal_envelope_wire_shape() {
        let scope = ReportScope::personal("u1").unwrap();
        let window = DateWindow::new("2024-01-01", "2024-01-31");
        let envelope = GenerationEnvelope::new(&scope, &window, "req-1", None);

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "event": "REPORT_REQUESTED",
                "correlationId": "req-1",
                "payload": {"userId": "u1", "startDate": "2024-01-01", "endDate": "2024-01-31"}
            })
        );
    }

    #[test]
    fn test_organisation_envelope_omits_missing_requester() {
        let window = DateWindow::new("2024-01-01", "2024-01-31");
        let envelope = GenerationEnvelope::new(&ReportScope::Organisation, &window, "r", None);
        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value["payload"].get("userId").is_none());

        let envelope = GenerationEnvelope::new(
            &ReportScope::Organisation,
            &window,
            "r",
            Some("admin-1".to_string()),
        );
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["payload"]["userId"], "admin-1");
        assert_eq!(value["event"], "ORGANISATION_REPORT_REQUESTED");
    }

    #[test]
    fn test_report_response_defaults_when_fields_missing() {
        let parsed: ReportServiceResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.data, ReportData::default());
        assert!(parsed.error.is_none());
    }
}
