//! CSV download for result tables and comparisons.

use crate::analysis::ResultSet;
use crate::compare::ComparisonPair;
use anyhow::{Context, Result};
use serde::Serialize;
use shared::AnimeRow;

#[derive(Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    image_url: &'a str,
    description: &'a str,
    score: f64,
    #[serde(rename = "type")]
    anime_type: &'a str,
    episodes: u32,
    members: u64,
    rank: Option<u32>,
    status: &'a str,
    year: Option<i32>,
}

impl<'a> From<&'a AnimeRow> for CsvRow<'a> {
    fn from(row: &'a AnimeRow) -> Self {
        Self {
            title: &row.title,
            image_url: &row.image_url,
            description: &row.description,
            score: row.score,
            anime_type: &row.anime_type,
            episodes: row.episodes_or_zero(),
            members: row.members,
            rank: row.rank,
            status: &row.status,
            year: row.year,
        }
    }
}

/// Serialize a result table as UTF-8 CSV with a header row
pub fn rows_to_csv(rows: &ResultSet) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        // serde only emits the header alongside the first record
        writer
            .write_record([
                "title",
                "image_url",
                "description",
                "score",
                "type",
                "episodes",
                "members",
                "rank",
                "status",
                "year",
            ])
            .context("Failed to write CSV header")?;
    }
    for row in rows {
        writer
            .serialize(CsvRow::from(row))
            .with_context(|| format!("Failed to write CSV row for {}", row.title))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))
}

/// Serialize the per-metric comparison table as CSV
pub fn comparison_to_csv(pair: &ComparisonPair) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Metric", pair.left.row.title.as_str(), pair.right.row.title.as_str()])
        .context("Failed to write CSV header")?;
    for row in pair.metric_table() {
        writer
            .write_record([row.metric, row.left.as_str(), row.right.as_str()])
            .with_context(|| format!("Failed to write CSV row for {}", row.metric))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))
}
