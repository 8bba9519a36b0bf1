use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use crate::error::Error;
use crate::retention::{Operator, SECONDS_PER_DAY};
use crate::tautulli::models::MediaDetailRecord;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BucketKey {
    /// Whole days since the item was added.
    DaysSinceAdded(i64),
    /// Calendar month of addition, `YYYY-MM`.
    Month(String),
}

/// One display group of candidate paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: BucketKey,
    pub label: String,
    pub paths: Vec<String>,
}

impl Bucket {
    pub fn heading(&self) -> String {
        match &self.key {
            BucketKey::DaysSinceAdded(days) => format!(
                "Items not watched within {} days, added {}:",
                days, self.label
            ),
            BucketKey::Month(month) => format!("Items not watched within month {}:", month),
        }
    }
}

/// Group candidates for review. `at_most` windows bucket by elapsed days,
/// `at_least` windows by calendar month; buckets come back in ascending order.
pub fn group_candidates<Tz>(
    items: &[MediaDetailRecord],
    operator: Operator,
    now: i64,
    tz: &Tz,
) -> Vec<Bucket>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut groups: BTreeMap<BucketKey, Vec<&MediaDetailRecord>> = BTreeMap::new();
    for item in items {
        let key = match operator {
            Operator::AtMost => {
                BucketKey::DaysSinceAdded(
                    now.saturating_sub(item.added_at).div_euclid(SECONDS_PER_DAY),
                )
            }
            Operator::AtLeast => BucketKey::Month(format_timestamp(item.added_at, tz, "%Y-%m")),
        };
        groups.entry(key).or_default().push(item);
    }

    groups
        .into_iter()
        .map(|(key, members)| {
            let label = match &key {
                BucketKey::DaysSinceAdded(_) => {
                    format_timestamp(members[0].added_at, tz, "%a %b %d")
                }
                BucketKey::Month(month) => month.clone(),
            };
            Bucket {
                key,
                label,
                paths: members.iter().map(|m| m.file_path.clone()).collect(),
            }
        })
        .collect()
}

fn format_timestamp<Tz>(secs: i64, tz: &Tz, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_opt(secs, 0).single() {
        Some(ts) => ts.format(fmt).to_string(),
        None => "unknown".to_string(),
    }
}

pub fn total_size(items: &[MediaDetailRecord]) -> u64 {
    items.iter().map(|item| item.file_size).sum()
}

/// Write one CSV row per candidate.
pub fn write_csv(path: &Path, items: &[MediaDetailRecord]) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "rating_key",
        "title",
        "grandparent_title",
        "media_type",
        "added_at",
        "file_size",
        "file_path",
    ])?;

    for item in items {
        let added_at = DateTime::<Utc>::from_timestamp(item.added_at, 0)
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default();
        wtr.write_record([
            item.rating_key.to_string(),
            item.title.clone(),
            item.grandparent_title.clone(),
            item.media_type.as_str().to_string(),
            added_at,
            item.file_size.to_string(),
            item.file_path.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
