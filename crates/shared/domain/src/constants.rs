//! Domain-level constants.
//!
//! Event kinds, header names and wire formats shared across services.

// =============================================================================
// Broker Events
// =============================================================================

/// Personal report requested
pub const EVENT_REPORT_REQUESTED: &str = "REPORT_REQUESTED";

/// Team report requested
pub const EVENT_TEAM_REPORT_REQUESTED: &str = "TEAM_REPORT_REQUESTED";

/// Department report requested
pub const EVENT_DEPARTMENT_REPORT_REQUESTED: &str = "DEPARTMENT_REPORT_REQUESTED";

/// Project report requested
pub const EVENT_PROJECT_REPORT_REQUESTED: &str = "PROJECT_REPORT_REQUESTED";

/// Organisation-wide report requested
pub const EVENT_ORGANISATION_REPORT_REQUESTED: &str = "ORGANISATION_REPORT_REQUESTED";

/// Partition key used for organisation-wide events (there is no scope id)
pub const ORGANISATION_PARTITION_KEY: &str = "organisation";

// =============================================================================
// Wire Formats
// =============================================================================

/// Correlation header propagated to downstream services and echoed to clients
pub const HEADER_REQUEST_ID: &str = "X-Request-ID";

/// Content type attached to every published event
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Date format used by report windows (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the default report window in months
pub const DEFAULT_WINDOW_MONTHS: u32 = 12;
