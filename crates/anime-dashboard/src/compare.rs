//! Side-by-side comparison of two anime.

use serde::Serialize;
use shared::AnimeDetail;
use std::collections::BTreeSet;
use std::fmt;

/// Assumed runtime of one episode, in minutes
pub const MINUTES_PER_EPISODE: u32 = 23;

/// Which of the two compared anime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

/// Estimated viewing time for one anime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeInvestment {
    pub hours: u32,
    pub minutes: u32,
}

impl TimeInvestment {
    pub fn for_episodes(episodes: u32) -> Self {
        let total = episodes.saturating_mul(MINUTES_PER_EPISODE);
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for TimeInvestment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{}h {}m", self.hours, self.minutes)
    }
}

/// Two anime plus the derived differences between them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPair {
    pub left: AnimeDetail,
    pub right: AnimeDetail,
    /// `left.score - right.score`
    pub score_delta: f64,
    /// `left.members - right.members`
    pub members_delta: i64,
    /// `left.episodes - right.episodes`, when both are known
    pub episode_delta: Option<i64>,
    pub shared_genres: BTreeSet<String>,
    /// Viewing time per side, when both episode counts are known
    pub time_investment: Option<(TimeInvestment, TimeInvestment)>,
    /// None when the scores are equal
    pub higher_rated: Option<Side>,
}

/// One row of the per-metric comparison table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub metric: &'static str,
    pub left: String,
    pub right: String,
}

pub fn compare(left: AnimeDetail, right: AnimeDetail) -> ComparisonPair {
    let score_delta = left.row.score - right.row.score;
    let members_delta = left.row.members as i64 - right.row.members as i64;

    let both_episodes = left.row.episodes.zip(right.row.episodes);
    let episode_delta = both_episodes.map(|(l, r)| i64::from(l) - i64::from(r));
    let time_investment = both_episodes
        .map(|(l, r)| (TimeInvestment::for_episodes(l), TimeInvestment::for_episodes(r)));

    let left_genres: BTreeSet<&String> = left.genres.iter().collect();
    let shared_genres = right
        .genres
        .iter()
        .filter(|genre| left_genres.contains(genre))
        .cloned()
        .collect();

    let higher_rated = if score_delta > 0.0 {
        Some(Side::Left)
    } else if score_delta < 0.0 {
        Some(Side::Right)
    } else {
        None
    };

    ComparisonPair {
        left,
        right,
        score_delta,
        members_delta,
        episode_delta,
        shared_genres,
        time_investment,
        higher_rated,
    }
}

fn episodes_cell(detail: &AnimeDetail) -> String {
    detail
        .row
        .episodes
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

impl ComparisonPair {
    pub fn title(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left.row.title,
            Side::Right => &self.right.row.title,
        }
    }

    /// Score, Episodes, Members, Type and Status for both sides
    pub fn metric_table(&self) -> Vec<MetricRow> {
        let (l, r) = (&self.left.row, &self.right.row);
        vec![
            MetricRow {
                metric: "Score",
                left: format!("{:.2}", l.score),
                right: format!("{:.2}", r.score),
            },
            MetricRow {
                metric: "Episodes",
                left: episodes_cell(&self.left),
                right: episodes_cell(&self.right),
            },
            MetricRow {
                metric: "Members",
                left: l.members.to_string(),
                right: r.members.to_string(),
            },
            MetricRow {
                metric: "Type",
                left: l.anime_type.clone(),
                right: r.anime_type.clone(),
            },
            MetricRow {
                metric: "Status",
                left: l.status.clone(),
                right: r.status.clone(),
            },
        ]
    }
}
