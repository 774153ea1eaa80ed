use super::errors::InvalidDateError;
use super::types::{Category, CategoryId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalizes a date or timestamp string to its calendar day.
///
/// Accepts `yyyy-mm-dd`, RFC 3339 timestamps (converted to UTC first) and
/// naive `yyyy-mm-dd hh:mm:ss` / `yyyy-mm-ddThh:mm:ss[.fff]` timestamps.
pub fn parse_due_date(input: &str) -> Result<NaiveDate, InvalidDateError> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Ok(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.with_timezone(&Utc).date_naive());
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|timestamp| timestamp.date())
        .ok_or_else(|| InvalidDateError(input.to_string()))
}

pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn deserialize_due_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_due_date(&raw).map_err(serde::de::Error::custom)
}

pub fn find_category<'a>(categories: &'a [Category], id: CategoryId) -> Option<&'a Category> {
    categories.iter().find(|category| category.id == id)
}

/// Resolves ids against the known categories, skipping ids that are not loaded.
pub fn resolve_categories(categories: &[Category], ids: &[CategoryId]) -> Vec<Category> {
    ids.iter()
        .filter_map(|id| find_category(categories, *id))
        .cloned()
        .collect()
}
