use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::models::{ActivityRecord, JoinedRecord};

/// Row shape of the industry map file. The file carries a header row; any
/// extra columns are ignored.
#[derive(Debug, Deserialize)]
struct IndustryRow {
    industry_id: i64,
    industry: String,
}

/// Read the headerless activity log, imposing the fixed column order
/// (ds, team_id, country, industry_id, active_users, messages_7d).
pub fn read_activity(path: &Path) -> anyhow::Result<Vec<ActivityRecord>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to open activity log {}", path.display()))?;
    parse_activity(reader)
}

fn parse_activity<R: Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Vec<ActivityRecord>> {
    let mut records = Vec::new();
    for (line, result) in reader.deserialize::<ActivityRecord>().enumerate() {
        let record = result.with_context(|| format!("malformed activity row {}", line + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Read the industry map into an id -> name lookup. Two spellings of the
/// healthcare industry exist in the source data, so every occurrence of
/// "Health Care" in a name is rewritten to "Healthcare" before the map is
/// built. Duplicate ids are rejected: a duplicated key would silently fan
/// out rows in the left join.
pub fn read_industry_map(path: &Path) -> anyhow::Result<HashMap<i64, String>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open industry map {}", path.display()))?;
    parse_industry_map(reader)
}

fn parse_industry_map<R: Read>(mut reader: csv::Reader<R>) -> anyhow::Result<HashMap<i64, String>> {
    let mut map = HashMap::new();
    for result in reader.deserialize::<IndustryRow>() {
        let row = result.context("malformed industry map row")?;
        let name = row.industry.replace("Health Care", "Healthcare");
        if map.insert(row.industry_id, name).is_some() {
            bail!("duplicate industry_id {} in industry map", row.industry_id);
        }
    }
    Ok(map)
}

/// Left-join activity rows onto the industry map. Every activity row is
/// preserved; rows with no matching industry keep `industry = None`.
pub fn join_industry(
    activity: Vec<ActivityRecord>,
    industries: &HashMap<i64, String>,
) -> Vec<JoinedRecord> {
    let mut unmatched = 0usize;
    let joined: Vec<JoinedRecord> = activity
        .into_iter()
        .map(|record| {
            let industry = industries.get(&record.industry_id).cloned();
            if industry.is_none() {
                unmatched += 1;
            }
            JoinedRecord::from_activity(record, industry)
        })
        .collect();

    if unmatched > 0 {
        tracing::warn!(unmatched, "activity rows without a matching industry");
    }
    joined
}

/// Form the working dataset: both files loaded, joined on industry_id.
pub fn load_dataset(activity_path: &Path, industry_path: &Path) -> anyhow::Result<Vec<JoinedRecord>> {
    let activity = read_activity(activity_path)?;
    let industries = read_industry_map(industry_path)?;
    tracing::info!(
        rows = activity.len(),
        industries = industries.len(),
        "loaded input files"
    );
    Ok(join_industry(activity, &industries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity_reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(data.as_bytes())
    }

    fn industry_reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn parses_headerless_activity_rows() {
        let data = "2020-07-01,11,US,3,42,900\n2020-07-02,11,US,3,40,870\n";
        let records = parse_activity(activity_reader(data)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].team_id, 11);
        assert_eq!(records[0].country, "US");
        assert_eq!(records[1].active_users, 40);
    }

    #[test]
    fn rejects_malformed_activity_row() {
        let data = "2020-07-01,11,US,3,not-a-number,900\n";
        assert!(parse_activity(activity_reader(data)).is_err());
    }

    #[test]
    fn normalizes_health_care_spelling() {
        let data = "industry_id,industry\n1,Health Care\n2,Healthcare\n3,Retail\n";
        let map = parse_industry_map(industry_reader(data)).unwrap();
        assert_eq!(map[&1], "Healthcare");
        assert_eq!(map[&2], "Healthcare");
        assert_eq!(map[&3], "Retail");
    }

    #[test]
    fn rejects_duplicate_industry_ids() {
        let data = "industry_id,industry\n1,Retail\n1,Finance\n";
        assert!(parse_industry_map(industry_reader(data)).is_err());
    }

    #[test]
    fn ignores_extra_industry_columns() {
        let data = "industry_id,industry,segment\n4,Finance,enterprise\n";
        let map = parse_industry_map(industry_reader(data)).unwrap();
        assert_eq!(map[&4], "Finance");
    }

    #[test]
    fn join_preserves_unmatched_rows() {
        let data = "2020-07-01,11,US,3,42,900\n2020-07-01,12,DE,99,5,100\n";
        let activity = parse_activity(activity_reader(data)).unwrap();
        let map = HashMap::from([(3, "Retail".to_string())]);

        let joined = join_industry(activity, &map);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].industry.as_deref(), Some("Retail"));
        assert_eq!(joined[1].industry, None);
    }

    #[test]
    fn healthcare_variants_collapse_to_one_label_in_join() {
        let industry_data = "industry_id,industry\n1,Health Care\n2,Healthcare\n";
        let map = parse_industry_map(industry_reader(industry_data)).unwrap();

        let activity_data = "2020-07-01,11,US,1,42,900\n2020-07-01,12,US,2,30,500\n";
        let activity = parse_activity(activity_reader(activity_data)).unwrap();

        let joined = join_industry(activity, &map);
        let labels: std::collections::HashSet<_> =
            joined.iter().filter_map(|r| r.industry.as_deref()).collect();
        assert_eq!(labels, std::collections::HashSet::from(["Healthcare"]));
    }
}
