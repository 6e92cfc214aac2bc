//! Access log of a single request, with caller IP details.

use authbox_api_models::{AccessLog, Page};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;

/// Facts gathered across the entries of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSummary {
    /// Caller IP, taken from the first entry.
    pub ip: Option<String>,
    /// Caller user agent, taken from the first entry.
    pub user_agent: Option<String>,
    /// Time of the first entry.
    pub timestamp: Option<DateTime<Utc>>,
    /// Status code of the last entry.
    pub status_code: Option<i32>,
    /// Last error recorded by any entry.
    pub error: Option<String>,
}

impl RequestSummary {
    /// Summarize entries in server order. Returns `None` when there are none.
    #[must_use]
    pub fn from_entries(entries: &[AccessLog]) -> Option<Self> {
        let first = entries.first()?;
        let last = entries.last()?;
        Some(Self {
            ip: first.ip.clone(),
            user_agent: first.user_agent.clone(),
            timestamp: first.create_time,
            status_code: last.status_code,
            error: entries.iter().rev().find_map(|entry| entry.error.clone()),
        })
    }

    /// Whether any entry recorded an error.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.error.is_some()
    }
}

/// Entries of one request id.
#[derive(Debug, Clone, Default)]
pub struct AccessLogView {
    request_id: Option<String>,
    entries: Option<Page<AccessLog>>,
    summary: Option<RequestSummary>,
    ip_details: Option<Value>,
}

impl AccessLogView {
    /// Request id of the last load.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Loaded entries.
    #[must_use]
    pub const fn entries(&self) -> Option<&Page<AccessLog>> {
        self.entries.as_ref()
    }

    /// Summary of the loaded entries.
    #[must_use]
    pub const fn summary(&self) -> Option<&RequestSummary> {
        self.summary.as_ref()
    }

    /// Whatever the server knows about the caller IP.
    #[must_use]
    pub const fn ip_details(&self) -> Option<&Value> {
        self.ip_details.as_ref()
    }

    /// Load the entries of a request, then the details of its caller IP.
    ///
    /// A blank request id loads nothing.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of either call. Entries stay loaded when
    /// only the IP lookup fails.
    pub async fn load(&mut self, ctx: &mut ConsoleContext, request_id: &str) -> ConsoleResult<()> {
        let request_id = request_id.trim();
        if request_id.is_empty() {
            return Ok(());
        }
        self.request_id = Some(request_id.to_string());
        let entries: Page<AccessLog> = ctx
            .call(&ApiRequest::get("/access-log").segment(request_id))
            .await?;
        self.summary = RequestSummary::from_entries(&entries.content);
        self.entries = Some(entries);
        self.ip_details = None;

        let ip = self.summary.as_ref().and_then(|summary| summary.ip.clone());
        if let Some(ip) = ip {
            let details = ctx
                .call(&ApiRequest::get("/access-log/ip").segment(ip))
                .await?;
            self.ip_details = Some(details);
        }
        Ok(())
    }
}
