use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::info;
use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::time_entry::TimeEntry;

const DETAILS_URL: &str = "https://toggl.com/reports/api/v2/details";

/// A failure reported by the detailed report endpoint.
///
/// A non-success status aborts the run instead of letting the aggregation
/// continue on partial or empty data.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("API request failed with status {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },
}

/// Immutable request context for one report run: who asks, for whom, and for
/// which date range.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRequest {
    pub user_agent: String,
    pub workspace_id: u64,
    pub user_ids: Vec<u64>,
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl ReportRequest {
    /// The `user_ids` query parameter, comma-joined.
    pub fn user_ids_param(&self) -> String {
        self.user_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One page of the paginated response envelope.
#[derive(Debug, Deserialize)]
struct DetailsPage {
    data: Vec<TimeEntry>,
    total_count: u64,
    per_page: u64,
}

/// Source of detailed time entries for a report run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DetailedReportApi {
    /// Returns the complete, unordered entry list for the request, however
    /// many pages the backend splits it into.
    async fn fetch_details(&self, request: &ReportRequest) -> Result<Vec<TimeEntry>>;
}

/// Client for the Toggl Reports API detailed report endpoint.
///
/// # Examples
///
/// ```
/// let client = TogglReportClient::new("0123456789abcdef");
/// let entries = client.fetch_details(&request).await?;
/// ```
pub struct TogglReportClient {
    client: Client,
    api_url: String,
    api_token: String,
}

impl TogglReportClient {
    /// Returns a new client authenticating with `api_token`.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: DETAILS_URL.to_string(),
            api_token: api_token.into(),
        }
    }

    /// Fetches a single page of the detailed report.
    async fn fetch_page(&self, request: &ReportRequest, page: u64) -> Result<DetailsPage> {
        info!(
            "Getting report page {} for user(s): {}",
            page,
            request.user_ids_param()
        );

        let query = [
            ("user_agent", request.user_agent.clone()),
            ("workspace_id", request.workspace_id.to_string()),
            ("user_ids", request.user_ids_param()),
            ("since", request.since.format("%Y-%m-%d").to_string()),
            ("until", request.until.format("%Y-%m-%d").to_string()),
            ("page", page.to_string()),
        ];
        let response = self
            .client
            .get(&self.api_url)
            .header(AUTHORIZATION, &self.api_token)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.api_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .context("Failed to read error response body")?;
            return Err(ReportError::RequestFailed { status, body }.into());
        }

        response
            .json::<DetailsPage>()
            .await
            .with_context(|| format!("Failed to deserialize report page {}", page))
    }
}

#[async_trait]
impl DetailedReportApi for TogglReportClient {
    async fn fetch_details(&self, request: &ReportRequest) -> Result<Vec<TimeEntry>> {
        let first = self.fetch_page(request, 1).await?;
        let pages = total_pages(first.total_count, first.per_page);

        let mut entries = first.data;
        for page in 2..=pages {
            let next = self.fetch_page(request, page).await?;
            entries.extend(next.data);
        }
        info!(
            "Retrieved {} of {} time entries",
            entries.len(),
            first.total_count
        );

        Ok(entries)
    }
}

/// Number of pages needed to cover `total_count` records.
fn total_pages(total_count: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 1;
    }
    ((total_count + per_page - 1) / per_page).max(1)
}
