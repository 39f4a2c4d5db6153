use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::models::JoinedRecord;

/// Teams with zero active users on every day of the window. These rows carry
/// no signal and distort the per-team averages downstream.
pub fn check_no_active_users(records: &[JoinedRecord]) -> BTreeSet<i64> {
    let mut max_users: HashMap<i64, u64> = HashMap::new();
    for record in records {
        let entry = max_users.entry(record.team_id).or_insert(0);
        *entry = (*entry).max(record.active_users);
    }

    max_users
        .into_iter()
        .filter(|&(_, max)| max == 0)
        .map(|(team_id, _)| team_id)
        .collect()
}

/// Teams not present on every day of the window. "Every day" is read off the
/// data itself: the largest per-team row count is taken as full presence and
/// any team below it is flagged.
pub fn check_consistent_cohort(records: &[JoinedRecord]) -> BTreeSet<i64> {
    let mut row_counts: HashMap<i64, usize> = HashMap::new();
    for record in records {
        *row_counts.entry(record.team_id).or_insert(0) += 1;
    }

    let full_presence = row_counts.values().copied().max().unwrap_or(0);
    row_counts
        .into_iter()
        .filter(|&(_, count)| count < full_presence)
        .map(|(team_id, _)| team_id)
        .collect()
}

/// Calendar days absent between the earliest and latest observed date.
/// Diagnostic only: the caller reports these but never filters on them.
pub fn check_missing_dates(records: &[JoinedRecord]) -> Vec<NaiveDate> {
    let observed: BTreeSet<NaiveDate> = records.iter().map(|r| r.ds).collect();
    let (Some(&start), Some(&end)) = (observed.first(), observed.last()) else {
        return Vec::new();
    };

    let mut missing = Vec::new();
    let mut day = start;
    while day <= end {
        if !observed.contains(&day) {
            missing.push(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    missing
}

/// Drop every row belonging to a flagged team.
pub fn drop_teams(records: Vec<JoinedRecord>, flagged: &BTreeSet<i64>) -> Vec<JoinedRecord> {
    records
        .into_iter()
        .filter(|record| !flagged.contains(&record.team_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ds: &str, team_id: i64, active_users: u64) -> JoinedRecord {
        JoinedRecord {
            ds: ds.parse().unwrap(),
            team_id,
            country: "US".to_string(),
            industry_id: 1,
            industry: Some("Retail".to_string()),
            active_users,
            messages_7d: active_users * 10,
        }
    }

    #[test]
    fn flags_teams_with_no_active_users_all_week() {
        let mut records = Vec::new();
        for day in 1..=7 {
            records.push(row(&format!("2020-07-{day:02}"), 1, 0));
            records.push(row(&format!("2020-07-{day:02}"), 2, 5));
        }

        let flagged = check_no_active_users(&records);
        assert_eq!(flagged, BTreeSet::from([1]));

        let cleaned = drop_teams(records, &flagged);
        assert!(cleaned.iter().all(|r| r.team_id != 1));
        assert_eq!(cleaned.len(), 7);
    }

    #[test]
    fn does_not_flag_team_with_a_single_active_day() {
        let records = vec![row("2020-07-01", 1, 0), row("2020-07-02", 1, 3)];
        assert!(check_no_active_users(&records).is_empty());
    }

    #[test]
    fn flags_teams_below_full_presence() {
        let mut records = Vec::new();
        for day in 1..=5 {
            records.push(row(&format!("2020-07-{day:02}"), 1, 4));
        }
        records.push(row("2020-07-01", 2, 9));
        records.push(row("2020-07-02", 2, 9));

        let flagged = check_consistent_cohort(&records);
        assert_eq!(flagged, BTreeSet::from([2]));
    }

    #[test]
    fn full_cohort_passes_consistency_check() {
        let records = vec![
            row("2020-07-01", 1, 4),
            row("2020-07-02", 1, 4),
            row("2020-07-01", 2, 9),
            row("2020-07-02", 2, 9),
        ];
        assert!(check_consistent_cohort(&records).is_empty());
    }

    #[test]
    fn finds_single_gap_in_daily_range() {
        let records = vec![
            row("2020-03-11", 1, 4),
            row("2020-03-12", 1, 4),
            row("2020-03-14", 1, 4),
            row("2020-03-15", 1, 4),
        ];

        let missing = check_missing_dates(&records);
        assert_eq!(missing, vec!["2020-03-13".parse::<NaiveDate>().unwrap()]);
    }

    #[test]
    fn contiguous_range_has_no_missing_dates() {
        let records = vec![row("2020-03-11", 1, 4), row("2020-03-12", 1, 4)];
        assert!(check_missing_dates(&records).is_empty());
    }

    #[test]
    fn missing_dates_on_empty_input_is_empty() {
        assert!(check_missing_dates(&[]).is_empty());
    }
}
