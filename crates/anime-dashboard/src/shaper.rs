//! Record shaping: raw Jikan records into fixed-schema rows.
//!
//! Defaults for every optional field live here and are applied exactly once.
//!
//! | field          | source                    | default                      |
//! |----------------|---------------------------|------------------------------|
//! | title          | `title`                   | required                     |
//! | image_url      | `images.jpg.image_url`    | `""`                         |
//! | description    | `synopsis`                | `"No description available"` |
//! | score          | `score`                   | `0.0`                        |
//! | anime_type     | `type`                    | `"Unknown"`                  |
//! | episodes       | `episodes`                | unknown (shown as 0)         |
//! | members        | `members`                 | `0`                          |
//! | rank           | `rank`                    | unknown                      |
//! | status         | `status`                  | `"Unknown"`                  |
//! | year           | `year`                    | unknown                      |
//! | english/japanese title | `title_english`, `title_japanese` | `""`         |
//! | genres/studios | `genres[].name`, `studios[].name` | empty                |
//! | aired          | `aired.string`            | `"Unknown"`                  |
//! | thumbnail      | `images.jpg.small_image_url` | `""`                      |

use crate::analysis::ResultSet;
use crate::api::types::{RawAnimeRecord, RawEntity, RawImageSet};
use crate::error::{DashboardError, Result};
use serde::Deserialize;
use serde_json::Value;
use shared::{AnimeDetail, AnimeRow, SuggestionEntry};
use tracing::warn;

pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_SCORE: f64 = 0.0;
pub const DEFAULT_MEMBERS: u64 = 0;

fn parse(raw: &Value) -> Result<RawAnimeRecord> {
    if !raw.is_object() {
        return Err(DashboardError::malformed("record is not an object"));
    }
    // Fields never fail individually, so this only rejects non-object input
    let record = RawAnimeRecord::deserialize(raw)
        .map_err(|e| DashboardError::malformed(format!("unexpected record layout: {}", e)))?;
    if record.title.is_none() {
        return Err(DashboardError::malformed(match record.mal_id {
            Some(id) => format!("record {} has no title", id),
            None => "record has no title".to_string(),
        }));
    }
    Ok(record)
}

fn jpg(record: &RawAnimeRecord) -> Option<&RawImageSet> {
    record.images.as_ref().and_then(|images| images.jpg.as_ref())
}

fn names(entities: Option<Vec<RawEntity>>) -> Vec<String> {
    entities
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entity| entity.name)
        .collect()
}

fn row_from(record: &RawAnimeRecord) -> AnimeRow {
    AnimeRow {
        mal_id: record.mal_id,
        title: record.title.clone().unwrap_or_default(),
        image_url: jpg(record)
            .and_then(|set| set.image_url.clone())
            .unwrap_or_default(),
        description: record
            .synopsis
            .clone()
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        score: record.score.unwrap_or(DEFAULT_SCORE),
        anime_type: record
            .anime_type
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        episodes: record.episodes,
        members: record.members.unwrap_or(DEFAULT_MEMBERS),
        rank: record.rank,
        status: record.status.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        year: record.year,
    }
}

/// Shape one raw record into a row
///
/// Fails only when the record has no string title or is not an object.
/// Any other field with an unexpected type takes its default.
pub fn shape(raw: &Value) -> Result<AnimeRow> {
    parse(raw).map(|record| row_from(&record))
}

/// Shape one raw record into a row plus comparison details
pub fn shape_detail(raw: &Value) -> Result<AnimeDetail> {
    let record = parse(raw)?;
    let row = row_from(&record);

    Ok(AnimeDetail {
        row,
        title_english: record.title_english.unwrap_or_default(),
        title_japanese: record.title_japanese.unwrap_or_default(),
        genres: names(record.genres),
        studios: names(record.studios),
        aired: record
            .aired
            .and_then(|aired| aired.string)
            .unwrap_or_else(|| UNKNOWN.to_string()),
    })
}

/// Shape one raw record into a suggestion entry
pub fn shape_suggestion(raw: &Value) -> Result<SuggestionEntry> {
    let record = parse(raw)?;

    Ok(SuggestionEntry {
        thumbnail_url: jpg(&record)
            .and_then(|set| set.small_image_url.clone())
            .unwrap_or_default(),
        id: record.mal_id.map(|id| id.to_string()).unwrap_or_default(),
        title: record.title.unwrap_or_default(),
        english_title: record.title_english.unwrap_or_default(),
        japanese_title: record.title_japanese.unwrap_or_default(),
    })
}

/// Shape a batch, skipping (and logging) malformed records
pub fn shape_all(records: &[Value]) -> ResultSet {
    let rows = records
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| match shape(raw) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!(index = idx, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();

    ResultSet::new(rows)
}
