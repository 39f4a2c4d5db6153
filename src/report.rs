use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{CountryTeamSize, DailySummary, IndustryUsers};

pub struct QualityFindings {
    pub inactive_teams: BTreeSet<i64>,
    pub partial_teams: BTreeSet<i64>,
    pub missing_dates: Vec<NaiveDate>,
}

pub fn build_report(
    quality: &QualityFindings,
    industries: &[IndustryUsers],
    countries: &[CountryTeamSize],
    daily: &[DailySummary],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Team Activity Report");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Data Quality");
    let _ = writeln!(
        output,
        "- Teams dropped with no active users all period: {}",
        quality.inactive_teams.len()
    );
    let _ = writeln!(
        output,
        "- Teams dropped for partial presence: {}",
        quality.partial_teams.len()
    );
    if quality.missing_dates.is_empty() {
        let _ = writeln!(output, "- No missing dates in the observed range.");
    } else {
        for date in &quality.missing_dates {
            let _ = writeln!(output, "- Missing date (not filtered): {date}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Active Users by Industry (Last 7 Days)");
    if industries.is_empty() {
        let _ = writeln!(output, "No industry data in this window.");
    } else {
        for row in industries {
            let _ = writeln!(
                output,
                "- {}: {} active users over 7 days ({:.0}/day)",
                row.industry, row.active_users, row.avg_daily_users
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Avg. Team Size in Top Countries (Last Month)");
    if countries.is_empty() {
        let _ = writeln!(output, "No country data in this window.");
    } else {
        for row in countries {
            let _ = writeln!(
                output,
                "- {}: {} distinct teams, avg team size {:.1}",
                row.country, row.countd_teams, row.avg_team_sz
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Trend");
    match (daily.first(), daily.last()) {
        (Some(first), Some(last)) => {
            let _ = writeln!(
                output,
                "{} days from {} to {}.",
                daily.len(),
                first.ds,
                last.ds
            );
            let _ = writeln!(
                output,
                "Latest day: {} teams, {} active users, {:.2}mm messages, {:.1} msgs/user.",
                last.countd_teams, last.total_active_users, last.total_msgs_mm, last.msgs_per_user
            );
        }
        _ => {
            let _ = writeln!(output, "No daily data in this window.");
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_findings_and_diagnostics() {
        let quality = QualityFindings {
            inactive_teams: BTreeSet::from([7]),
            partial_teams: BTreeSet::new(),
            missing_dates: vec!["2020-03-13".parse().unwrap()],
        };
        let industries = vec![IndustryUsers {
            industry: "Healthcare".to_string(),
            active_users: 700,
            avg_daily_users: 100.0,
        }];
        let countries = vec![CountryTeamSize {
            country: "US".to_string(),
            countd_teams: 12,
            avg_team_sz: 34.5,
        }];
        let daily = vec![DailySummary {
            ds: "2020-07-31".parse().unwrap(),
            countd_teams: 12,
            total_active_users: 400,
            avg_team_users: 33.3,
            total_msgs_mm: 1.2,
            msgs_per_user: 3000.0,
        }];

        let report = build_report(&quality, &industries, &countries, &daily);
        assert!(report.contains("Missing date (not filtered): 2020-03-13"));
        assert!(report.contains("Healthcare: 700 active users"));
        assert!(report.contains("US: 12 distinct teams"));
        assert!(report.contains("no active users all period: 1"));
    }

    #[test]
    fn report_handles_empty_summaries() {
        let quality = QualityFindings {
            inactive_teams: BTreeSet::new(),
            partial_teams: BTreeSet::new(),
            missing_dates: Vec::new(),
        };
        let report = build_report(&quality, &[], &[], &[]);
        assert!(report.contains("No missing dates"));
        assert!(report.contains("No daily data in this window."));
    }
}
