//! HTTP clients for calling downstream services.

mod report_client;

pub use report_client::{DownstreamReply, HttpReportClient, ReportClient};

#[cfg(any(test, feature = "test-utils"))]
pub use report_client::MockReportClient;
