use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{CountryTeamSize, DailySummary, IndustryUsers, JoinedRecord};

fn window_end(records: &[JoinedRecord]) -> Option<NaiveDate> {
    records.iter().map(|r| r.ds).max()
}

/// Industries ranked by active users over the final 7 days of the window.
/// The cutoff is derived from the latest observed date rather than a fixed
/// calendar constant. Rows with no industry name are left out of the
/// ranking, the same way an unlabeled group is dropped upstream.
pub fn active_users_by_industry(records: &[JoinedRecord]) -> Vec<IndustryUsers> {
    let Some(end) = window_end(records) else {
        return Vec::new();
    };
    let cutoff = end - Duration::days(6);

    let mut totals: HashMap<&str, u64> = HashMap::new();
    for record in records {
        if record.ds < cutoff {
            continue;
        }
        if let Some(industry) = record.industry.as_deref() {
            *totals.entry(industry).or_insert(0) += record.active_users;
        }
    }

    let mut rows: Vec<IndustryUsers> = totals
        .into_iter()
        .map(|(industry, active_users)| IndustryUsers {
            industry: industry.to_string(),
            active_users,
            avg_daily_users: active_users as f64 / 7.0,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.active_users
            .cmp(&a.active_users)
            .then_with(|| a.industry.cmp(&b.industry))
    });
    rows
}

/// Average team size in the countries with the most distinct teams, using
/// the final calendar month of the window as a more stable size measure.
/// Countries are ranked by distinct team count (ties share a rank), cut to
/// the top `top_n`, then re-sorted by average team size for charting.
pub fn avg_team_size_top_countries(records: &[JoinedRecord], top_n: usize) -> Vec<CountryTeamSize> {
    let Some(end) = window_end(records) else {
        return Vec::new();
    };
    // first day of the month containing the latest observation
    let month_start = NaiveDate::from_ymd_opt(end.year(), end.month(), 1)
        .unwrap_or(end);

    struct Acc {
        teams: HashSet<i64>,
        user_sum: u64,
        rows: usize,
    }

    let mut by_country: HashMap<&str, Acc> = HashMap::new();
    for record in records {
        if record.ds < month_start {
            continue;
        }
        let acc = by_country.entry(record.country.as_str()).or_insert(Acc {
            teams: HashSet::new(),
            user_sum: 0,
            rows: 0,
        });
        acc.teams.insert(record.team_id);
        acc.user_sum += record.active_users;
        acc.rows += 1;
    }

    let mut rows: Vec<CountryTeamSize> = by_country
        .into_iter()
        .map(|(country, acc)| CountryTeamSize {
            country: country.to_string(),
            countd_teams: acc.teams.len(),
            avg_team_sz: acc.user_sum as f64 / acc.rows as f64,
        })
        .collect();

    // rank by distinct team count, ties sharing the higher rank
    rows.sort_by(|a, b| {
        b.countd_teams
            .cmp(&a.countd_teams)
            .then_with(|| a.country.cmp(&b.country))
    });
    let mut rank = 0usize;
    let mut previous_count = None;
    let mut kept = Vec::new();
    for (position, row) in rows.into_iter().enumerate() {
        if previous_count != Some(row.countd_teams) {
            rank = position + 1;
            previous_count = Some(row.countd_teams);
        }
        if rank > top_n {
            break;
        }
        kept.push(row);
    }
    kept.truncate(top_n);

    kept.sort_by(|a, b| {
        b.avg_team_sz
            .partial_cmp(&a.avg_team_sz)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    kept
}

/// Whole-window daily trend: distinct teams, total and mean active users,
/// messages in millions, and messages per active user.
pub fn daily_summary_figures(records: &[JoinedRecord]) -> Vec<DailySummary> {
    struct Acc {
        teams: HashSet<i64>,
        user_sum: u64,
        msg_sum: u64,
        rows: usize,
    }

    let mut by_day: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for record in records {
        let acc = by_day.entry(record.ds).or_insert(Acc {
            teams: HashSet::new(),
            user_sum: 0,
            msg_sum: 0,
            rows: 0,
        });
        acc.teams.insert(record.team_id);
        acc.user_sum += record.active_users;
        acc.msg_sum += record.messages_7d;
        acc.rows += 1;
    }

    by_day
        .into_iter()
        .map(|(ds, acc)| {
            let msgs_per_user = if acc.user_sum == 0 {
                0.0
            } else {
                acc.msg_sum as f64 / acc.user_sum as f64
            };
            DailySummary {
                ds,
                countd_teams: acc.teams.len(),
                total_active_users: acc.user_sum,
                avg_team_users: acc.user_sum as f64 / acc.rows as f64,
                total_msgs_mm: acc.msg_sum as f64 / 1e6,
                msgs_per_user,
            }
        })
        .collect()
}
