use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::config::Config;
use crate::report::render_report;
use crate::toggl::{DetailedReportApi, ReportRequest};

/// Drives one report run: fetch all entries for the date range, aggregate,
/// and render the HTML document.
pub struct ReportCommand<'a, T: DetailedReportApi> {
    api: &'a T,
}

impl<'a, T: DetailedReportApi> ReportCommand<'a, T> {
    pub fn new(api: &'a T) -> Self {
        Self { api }
    }

    /// Returns the rendered HTML report for `[since, until]`.
    pub async fn run(&self, config: &Config, since: NaiveDate, until: NaiveDate) -> Result<String> {
        let request = ReportRequest {
            user_agent: config.user.clone(),
            workspace_id: config.workspace,
            user_ids: config.reportee_ids(),
            since,
            until,
        };

        let entries = self
            .api
            .fetch_details(&request)
            .await
            .context("Failed to retrieve time entries")?;
        info!("Time entries retrieved successfully.");

        Ok(render_report(&entries, &config.reportees, &request))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use anyhow::anyhow;
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::ReportCommand;
    use crate::config::Config;
    use crate::time_entry::TimeEntry;
    use crate::toggl::MockDetailedReportApi;

    fn config() -> Config {
        Config {
            user: "jane@example.com".to_string(),
            workspace: 123456,
            api_key: "secret".to_string(),
            report_file: PathBuf::from("report.html"),
            reportees: BTreeMap::from([
                (1001, "Jane Doe".to_string()),
                (1002, "John Doe".to_string()),
            ]),
        }
    }

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 3, 1).unwrap()
    }

    fn until() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 3, 15).unwrap()
    }

    /// The request context is built from the config and the date arguments.
    #[tokio::test]
    async fn test_run_builds_request_from_config() {
        let mut api = MockDetailedReportApi::new();
        api.expect_fetch_details()
            .withf(|request| {
                request.user_agent == "jane@example.com"
                    && request.workspace_id == 123456
                    && request.user_ids == vec![1001, 1002]
                    && request.since.to_string() == "2016-03-01"
                    && request.until.to_string() == "2016-03-15"
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let command = ReportCommand::new(&api);
        let result = command.run(&config(), since(), until()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_renders_fetched_entries() {
        let mut api = MockDetailedReportApi::new();
        api.expect_fetch_details().times(1).returning(|_| {
            Ok(vec![TimeEntry {
                uid: 1001,
                project: "Alpha".to_string(),
                dur: 3_600_000,
                tags: vec!["Billable".to_string()],
                start: Utc.with_ymd_and_hms(2016, 3, 1, 9, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2016, 3, 1, 10, 0, 0).unwrap(),
                description: "work".to_string(),
            }])
        });

        let command = ReportCommand::new(&api);
        let report = command.run(&config(), since(), until()).await.unwrap();

        assert!(report.contains("<b>Alpha</b>"));
        assert!(report.contains("Billable: 1.00h"));
        assert!(report.contains("Timesheet Report for Jane Doe"));
    }

    /// An API failure aborts the run; no report is produced from partial
    /// data.
    #[tokio::test]
    async fn test_run_propagates_api_failure() {
        let mut api = MockDetailedReportApi::new();
        api.expect_fetch_details()
            .times(1)
            .returning(|_| Err(anyhow!("API request failed with status 500")));

        let command = ReportCommand::new(&api);
        let result = command.run(&config(), since(), until()).await;

        assert!(result.is_err());
    }
}
