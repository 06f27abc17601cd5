//! Filtering and summary statistics over shaped rows.

use crate::error::{DashboardError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::AnimeRow;

/// Number of histogram bins used by the score distribution charts
pub const HISTOGRAM_BINS: usize = 20;

/// Ordered rows in API response order
///
/// Filtering produces a new set; rows are never modified in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    rows: Vec<AnimeRow>,
    fetched_at: DateTime<Utc>,
}

impl ResultSet {
    pub fn new(rows: Vec<AnimeRow>) -> Self {
        Self {
            rows,
            fetched_at: Utc::now(),
        }
    }

    pub fn rows(&self) -> &[AnimeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnimeRow> {
        self.rows.iter()
    }

    /// When the underlying response was shaped
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Rows with `score >= min_score`, in their original order
    pub fn filter_by_score(&self, min_score: f64) -> ResultSet {
        ResultSet {
            rows: self
                .rows
                .iter()
                .filter(|row| row.score >= min_score)
                .cloned()
                .collect(),
            fetched_at: self.fetched_at,
        }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a AnimeRow;
    type IntoIter = std::slice::Iter<'a, AnimeRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Headline statistics for a result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_score: f64,
    /// Most frequent format; ties go to the one seen first
    pub modal_type: String,
    pub modal_type_count: usize,
    pub total_members: u64,
}

/// Compute summary statistics
///
/// Fails with [`DashboardError::EmptyResult`] on an empty set rather than
/// producing a NaN mean.
pub fn summarize(rows: &ResultSet) -> Result<Summary> {
    if rows.is_empty() {
        return Err(DashboardError::EmptyResult);
    }

    let count = rows.len();
    let mean_score = rows.iter().map(|row| row.score).sum::<f64>() / count as f64;
    let total_members = rows.iter().map(|row| row.members).sum();

    let mut modal: Option<&TypeShare> = None;
    let distribution = type_distribution(rows);
    for share in &distribution {
        // Strictly greater keeps the first-seen type on ties
        if modal.map_or(true, |best| share.count > best.count) {
            modal = Some(share);
        }
    }
    let (modal_type, modal_type_count) = modal
        .map(|share| (share.anime_type.clone(), share.count))
        .ok_or(DashboardError::EmptyResult)?;

    Ok(Summary {
        count,
        mean_score,
        modal_type,
        modal_type_count,
        total_members,
    })
}

/// Count of one format within a result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShare {
    pub anime_type: String,
    pub count: usize,
    pub fraction: f64,
}

/// Format counts in first-seen order (pie chart input)
pub fn type_distribution(rows: &ResultSet) -> Vec<TypeShare> {
    let mut shares: Vec<TypeShare> = Vec::new();
    for row in rows {
        match shares.iter_mut().find(|s| s.anime_type == row.anime_type) {
            Some(share) => share.count += 1,
            None => shares.push(TypeShare {
                anime_type: row.anime_type.clone(),
                count: 1,
                fraction: 0.0,
            }),
        }
    }

    let total = rows.len() as f64;
    for share in &mut shares {
        share.fraction = share.count as f64 / total;
    }
    shares
}

/// One bar of a score histogram; `upper` is inclusive only for the last bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width score histogram over the observed score range
pub fn score_histogram(rows: &ResultSet, bins: usize) -> Vec<HistogramBin> {
    if rows.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = rows.iter().map(|r| r.score).fold(f64::INFINITY, f64::min);
    let max = rows.iter().map(|r| r.score).fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: rows.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|idx| HistogramBin {
            lower: min + width * idx as f64,
            upper: if idx + 1 == bins {
                max
            } else {
                min + width * (idx + 1) as f64
            },
            count: 0,
        })
        .collect();

    for row in rows {
        let idx = (((row.score - min) / width).floor() as usize).min(bins - 1);
        histogram[idx].count += 1;
    }
    histogram
}

/// One point of the score-vs-popularity scatter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularityPoint {
    pub title: String,
    pub members: u64,
    pub score: f64,
    pub rank: Option<u32>,
}

pub fn popularity_points(rows: &ResultSet) -> Vec<PopularityPoint> {
    rows.iter()
        .map(|row| PopularityPoint {
            title: row.title.clone(),
            members: row.members,
            score: row.score,
            rank: row.rank,
        })
        .collect()
}
