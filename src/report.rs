use std::collections::BTreeMap;

use crate::aggregate::{billable_by_project, ProjectTallies};
use crate::time_entry::TimeEntry;
use crate::toggl::ReportRequest;

const SUMMARY_URL: &str = "https://www.toggl.com/app/reports/summary";
const ALL_EMPLOYEES: &str = "All Employees";

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Formats a millisecond duration as hours with two decimals, e.g. `1.50h`.
fn format_hours(millis: i64) -> String {
    format!("{:.2}h", millis as f64 / MILLIS_PER_HOUR)
}

/// Link to the equivalent hosted summary view. Display only, never fetched.
pub fn summary_url(request: &ReportRequest) -> String {
    format!(
        "{}/{}/from/{}/to/{}/users/{}/billable/both",
        SUMMARY_URL,
        request.workspace_id,
        request.since,
        request.until,
        request.user_ids_param(),
    )
}

/// Renders one report section: a header naming the reportee and the date
/// range, then per-project hour totals.
fn render_section(tallies: &ProjectTallies, label: &str, request: &ReportRequest) -> String {
    let mut output = String::new();
    output.push_str("\n____________________________ <br/>");
    output.push_str(&format!(
        "\n<h3>Timesheet Report for {} ({}-{})</h3>",
        label, request.since, request.until
    ));

    for (project, tally) in tallies.iter() {
        output.push_str(&format!("\n<br/><b>{}</b><br/>", project));
        output.push_str(&format!(
            "\n&nbsp;&nbsp;Total: {}<br/>",
            format_hours(tally.total)
        ));
        output.push_str(&format!(
            "\n&nbsp;&nbsp;<b style='color:blue;'>Billable: {}</b><br/>",
            format_hours(tally.billable)
        ));
        output.push_str(&format!(
            "\n&nbsp;&nbsp;Discounted: {}<br/>",
            format_hours(tally.discounted)
        ));
    }

    output
}

/// Assembles the full HTML document: page header with the hosted summary
/// link, the combined section for every reportee, then one section per
/// reportee in ascending user id order.
pub fn render_report(
    entries: &[TimeEntry],
    reportees: &BTreeMap<u64, String>,
    request: &ReportRequest,
) -> String {
    let mut output = String::from("<html>");
    output.push_str(&format!(
        "\n<h2>Summary Timesheet Report for {}<br/>\nfrom {} to {}</h2>",
        ALL_EMPLOYEES, request.since, request.until
    ));
    output.push_str(&format!(
        "\nA similar report for this date range can be viewed <a href='{}'>here</a>.<br/><br/>",
        summary_url(request)
    ));

    let combined_ids: Vec<u64> = reportees.keys().copied().collect();
    let combined = billable_by_project(entries, &combined_ids);
    output.push_str(&render_section(&combined, ALL_EMPLOYEES, request));

    output.push_str("\n<br/><br/><br/>Additional reports below...<br/><br/>");

    for (user_id, name) in reportees {
        let tallies = billable_by_project(entries, &[*user_id]);
        output.push_str(&render_section(&tallies, name, request));
    }

    output.push_str("\n</html>");
    output
}
