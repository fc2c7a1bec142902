use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    Radarr,
    Sonarr,
}

impl InstanceKind {
    pub const ALL: &[InstanceKind] = &[InstanceKind::Radarr, InstanceKind::Sonarr];
}

impl std::fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Radarr => write!(f, "radarr"),
            Self::Sonarr => write!(f, "sonarr"),
        }
    }
}

impl std::str::FromStr for InstanceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "radarr" => Ok(Self::Radarr),
            "sonarr" => Ok(Self::Sonarr),
            other => Err(format!("unknown instance kind: {other}")),
        }
    }
}

/// A configured remote media-management server. The name doubles as the
/// stable identifier; the calendar engine never mutates instances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instance {
    pub name: String,
    pub kind: InstanceKind,
    pub url: Url,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub sort_title: String,
    pub year: i32,
    #[serde(default)]
    pub tmdb_id: u64,
    pub monitored: bool,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub size_on_disk: Option<u64>,
    pub added: DateTime<Utc>,
    #[serde(default)]
    pub ratings: Ratings,
    #[serde(default)]
    pub movie_file: Option<MovieFile>,
    #[serde(default)]
    pub digital_release: Option<DateTime<Utc>>,
    #[serde(default)]
    pub physical_release: Option<DateTime<Utc>>,
    #[serde(default)]
    pub in_cinemas: Option<DateTime<Utc>>,
}

impl Movie {
    /// Mean of the rating sources the server knows about, 0.0 when none.
    pub fn rating_score(&self) -> f64 {
        let scores: Vec<f64> = [self.ratings.imdb.as_ref(), self.ratings.tmdb.as_ref()]
            .into_iter()
            .flatten()
            .filter(|r| r.value > 0.0)
            .map(|r| r.value)
            .collect();

        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }

    /// Every release timestamp relevant to calendar placement.
    pub fn release_dates(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        [self.digital_release, self.physical_release, self.in_cinemas]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ratings {
    #[serde(default)]
    pub imdb: Option<Rating>,
    #[serde(default)]
    pub tmdb: Option<Rating>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieFile {
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: u64,
    pub series_id: u64,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub series_title: Option<String>,
    pub monitored: bool,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub air_date_utc: Option<DateTime<Utc>>,
}

/// What one instance's calendar query produced. Radarr-style instances
/// report movies, Sonarr-style instances report episodes.
#[derive(Debug, Clone)]
pub enum ReleaseBatch {
    Movies(Vec<Movie>),
    Episodes(Vec<Episode>),
}

impl ReleaseBatch {
    pub fn len(&self) -> usize {
        match self {
            Self::Movies(m) => m.len(),
            Self::Episodes(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
