//! Data models for the dashboard.
//!
//! This module defines the shaped anime rows, the view parameters assembled
//! from user input, and the suggestion entries shown while typing.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Lowest score accepted by score filters.
pub const MIN_SCORE: f64 = 0.0;

/// Highest score accepted by score filters.
pub const MAX_SCORE: f64 = 10.0;

/// Anime format (TV, Movie, OVA, etc.)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnimeFormat {
    #[serde(rename = "TV")]
    Tv,
    Movie,
    #[serde(rename = "OVA")]
    Ova,
    Special,
    #[serde(rename = "ONA")]
    Ona,
    Music,
}

impl AnimeFormat {
    /// All formats, in display order
    pub const ALL: [AnimeFormat; 6] = [
        AnimeFormat::Tv,
        AnimeFormat::Movie,
        AnimeFormat::Ova,
        AnimeFormat::Special,
        AnimeFormat::Ona,
        AnimeFormat::Music,
    ];

    /// Lowercase code expected by the `type` query parameter
    pub fn api_code(&self) -> &'static str {
        match self {
            AnimeFormat::Tv => "tv",
            AnimeFormat::Movie => "movie",
            AnimeFormat::Ova => "ova",
            AnimeFormat::Special => "special",
            AnimeFormat::Ona => "ona",
            AnimeFormat::Music => "music",
        }
    }

    /// Human-readable label, matching the `type` field in API records
    pub fn label(&self) -> &'static str {
        match self {
            AnimeFormat::Tv => "TV",
            AnimeFormat::Movie => "Movie",
            AnimeFormat::Ova => "OVA",
            AnimeFormat::Special => "Special",
            AnimeFormat::Ona => "ONA",
            AnimeFormat::Music => "Music",
        }
    }
}

impl std::fmt::Display for AnimeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for AnimeFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tv" => Ok(AnimeFormat::Tv),
            "movie" => Ok(AnimeFormat::Movie),
            "ova" => Ok(AnimeFormat::Ova),
            "special" => Ok(AnimeFormat::Special),
            "ona" => Ok(AnimeFormat::Ona),
            "music" => Ok(AnimeFormat::Music),
            _ => Err(anyhow!("Invalid anime format: {}", s)),
        }
    }
}

/// Ranking category for the top anime view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopCategory {
    #[default]
    AllTimeBest,
    Airing,
    MostPopular,
    Upcoming,
}

impl TopCategory {
    /// Value for the `filter` query parameter (None = default ranking)
    pub fn api_filter(&self) -> Option<&'static str> {
        match self {
            TopCategory::AllTimeBest => None,
            TopCategory::Airing => Some("airing"),
            TopCategory::MostPopular => Some("bypopularity"),
            TopCategory::Upcoming => Some("upcoming"),
        }
    }
}

impl std::fmt::Display for TopCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopCategory::AllTimeBest => write!(f, "All Time Best"),
            TopCategory::Airing => write!(f, "Currently Airing"),
            TopCategory::MostPopular => write!(f, "Most Popular"),
            TopCategory::Upcoming => write!(f, "Upcoming Releases"),
        }
    }
}

impl std::str::FromStr for TopCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all-time-best" | "best" => Ok(TopCategory::AllTimeBest),
            "airing" => Ok(TopCategory::Airing),
            "popular" | "bypopularity" => Ok(TopCategory::MostPopular),
            "upcoming" => Ok(TopCategory::Upcoming),
            _ => Err(anyhow!("Invalid top category: {}", s)),
        }
    }
}

fn validate_score(min_score: f64) -> Result<f64> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&min_score) {
        return Err(anyhow!(
            "Minimum score {} is outside {}..={}",
            min_score,
            MIN_SCORE,
            MAX_SCORE
        ));
    }
    Ok(min_score)
}

/// Parameters for the search view
///
/// Deserialization goes through [`SearchParameters::new`], so stored
/// parameters are validated the same way as freshly assembled ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SearchParametersInput")]
pub struct SearchParameters {
    pub query: String,
    min_score: f64,
    formats: Vec<AnimeFormat>,
    pub limit: Option<u32>,
}

impl SearchParameters {
    /// Create search parameters, rejecting scores outside 0..=10
    ///
    /// Duplicate formats are collapsed; the first occurrence keeps its position.
    pub fn new(query: impl Into<String>, min_score: f64, formats: &[AnimeFormat]) -> Result<Self> {
        let mut unique = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique.contains(format) {
                unique.push(*format);
            }
        }

        Ok(Self {
            query: query.into(),
            min_score: validate_score(min_score)?,
            formats: unique,
            limit: None,
        })
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn formats(&self) -> &[AnimeFormat] {
        &self.formats
    }

    /// Comma-joined lowercase format codes, or None when no filter is set
    pub fn type_filter(&self) -> Option<String> {
        if self.formats.is_empty() {
            return None;
        }
        Some(
            self.formats
                .iter()
                .map(|f| f.api_code())
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

#[derive(Deserialize)]
struct SearchParametersInput {
    query: String,
    min_score: f64,
    #[serde(default)]
    formats: Vec<AnimeFormat>,
    #[serde(default)]
    limit: Option<u32>,
}

impl TryFrom<SearchParametersInput> for SearchParameters {
    type Error = anyhow::Error;

    fn try_from(input: SearchParametersInput) -> Result<Self> {
        let params = Self::new(input.query, input.min_score, &input.formats)?;
        Ok(match input.limit {
            Some(limit) => params.with_limit(limit),
            None => params,
        })
    }
}

/// Parameters for the top anime view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TopParametersInput")]
pub struct TopParameters {
    pub category: TopCategory,
    pub format: Option<AnimeFormat>,
    min_score: f64,
}

impl TopParameters {
    pub fn new(category: TopCategory, format: Option<AnimeFormat>, min_score: f64) -> Result<Self> {
        Ok(Self {
            category,
            format,
            min_score: validate_score(min_score)?,
        })
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }
}

#[derive(Deserialize)]
struct TopParametersInput {
    #[serde(default)]
    category: TopCategory,
    #[serde(default)]
    format: Option<AnimeFormat>,
    min_score: f64,
}

impl TryFrom<TopParametersInput> for TopParameters {
    type Error = anyhow::Error;

    fn try_from(input: TopParametersInput) -> Result<Self> {
        Self::new(input.category, input.format, input.min_score)
    }
}

/// Anime record shaped into a fixed schema
///
/// Optional source fields are defaulted once at shaping time; downstream code
/// never re-derives defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRow {
    pub mal_id: Option<u32>,
    pub title: String,
    pub image_url: String,
    pub description: String,
    pub score: f64,
    pub anime_type: String,
    pub episodes: Option<u32>,
    pub members: u64,
    pub rank: Option<u32>,
    pub status: String,
    pub year: Option<i32>,
}

impl AnimeRow {
    /// Episode count for numeric columns (unknown renders as 0)
    pub fn episodes_or_zero(&self) -> u32 {
        self.episodes.unwrap_or(0)
    }
}

/// Anime row with the extra fields used by the comparison view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeDetail {
    pub row: AnimeRow,
    pub title_english: String,
    pub title_japanese: String,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub aired: String,
}

/// Search suggestion shown while the user types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionEntry {
    pub title: String,
    pub english_title: String,
    pub japanese_title: String,
    pub thumbnail_url: String,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_round_trip_labels() {
        for format in AnimeFormat::ALL {
            let parsed: AnimeFormat = format.label().parse().unwrap();
            assert_eq!(parsed, format);
            let parsed: AnimeFormat = format.api_code().parse().unwrap();
            assert_eq!(parsed, format);
        }
        assert!("Manga".parse::<AnimeFormat>().is_err());
    }

    #[test]
    fn test_type_filter_joins_lowercase_codes() {
        let params = SearchParameters::new(
            "naruto",
            5.0,
            &[AnimeFormat::Tv, AnimeFormat::Movie, AnimeFormat::Tv],
        )
        .unwrap();

        assert_eq!(params.formats(), &[AnimeFormat::Tv, AnimeFormat::Movie]);
        assert_eq!(params.type_filter().as_deref(), Some("tv,movie"));

        let params = SearchParameters::new("naruto", 5.0, &[]).unwrap();
        assert_eq!(params.type_filter(), None);
    }

    #[test]
    fn test_score_bounds_are_inclusive() {
        assert!(SearchParameters::new("a", 0.0, &[]).is_ok());
        assert!(SearchParameters::new("a", 10.0, &[]).is_ok());
        assert!(SearchParameters::new("a", -0.1, &[]).is_err());
        assert!(SearchParameters::new("a", 10.1, &[]).is_err());
        assert!(SearchParameters::new("a", f64::NAN, &[]).is_err());
        assert!(TopParameters::new(TopCategory::Airing, None, 11.0).is_err());
    }

    #[test]
    fn test_top_category_filters() {
        assert_eq!(TopCategory::AllTimeBest.api_filter(), None);
        assert_eq!(TopCategory::Airing.api_filter(), Some("airing"));
        assert_eq!(TopCategory::MostPopular.api_filter(), Some("bypopularity"));
        assert_eq!(TopCategory::Upcoming.api_filter(), Some("upcoming"));
        assert_eq!("popular".parse::<TopCategory>().unwrap(), TopCategory::MostPopular);
    }

    #[test]
    fn test_top_category_parse_ignores_case() {
        assert_eq!("Airing".parse::<TopCategory>().unwrap(), TopCategory::Airing);
        assert_eq!(" POPULAR ".parse::<TopCategory>().unwrap(), TopCategory::MostPopular);
        assert_eq!("All".parse::<TopCategory>().unwrap(), TopCategory::AllTimeBest);
        assert!("weekly".parse::<TopCategory>().is_err());
    }

    #[test]
    fn test_deserialized_parameters_are_validated() {
        let params: SearchParameters = toml::from_str(
            r#"
query = "bebop"
min_score = 6.5
formats = ["TV", "TV", "Movie"]
limit = 10
"#,
        )
        .unwrap();
        assert_eq!(params.min_score(), 6.5);
        assert_eq!(params.formats(), &[AnimeFormat::Tv, AnimeFormat::Movie]);
        assert_eq!(params.limit, Some(10));

        let out_of_range = toml::from_str::<SearchParameters>("query = \"x\"\nmin_score = 42.0\n");
        assert!(out_of_range.is_err());

        let top: TopParameters =
            toml::from_str("category = \"airing\"\nmin_score = 7.0\n").unwrap();
        assert_eq!(top.category, TopCategory::Airing);
        assert!(toml::from_str::<TopParameters>("min_score = -1.0\n").is_err());
    }

    #[test]
    fn test_episodes_or_zero() {
        let row = AnimeRow {
            mal_id: None,
            title: "X".to_string(),
            image_url: String::new(),
            description: String::new(),
            score: 0.0,
            anime_type: "TV".to_string(),
            episodes: None,
            members: 0,
            rank: None,
            status: "Unknown".to_string(),
            year: None,
        };
        assert_eq!(row.episodes_or_zero(), 0);
    }
}
