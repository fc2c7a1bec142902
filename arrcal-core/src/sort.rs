use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Movie;

/// Ordering criterion for movie lists. `compare` is the ascending
/// baseline; callers reverse it for descending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    Title,
    Year,
    Added,
    Rating,
    Grabbed,
    Size,
    Release,
}

impl SortOption {
    pub const ALL: &[SortOption] = &[
        SortOption::Title,
        SortOption::Year,
        SortOption::Added,
        SortOption::Rating,
        SortOption::Grabbed,
        SortOption::Size,
        SortOption::Release,
    ];

    pub fn compare(&self, lhs: &Movie, rhs: &Movie) -> Ordering {
        match self {
            Self::Title => lhs.sort_title.cmp(&rhs.sort_title),
            Self::Year => lhs.year.cmp(&rhs.year),
            Self::Added => lhs.added.cmp(&rhs.added),
            Self::Rating => lhs.rating_score().total_cmp(&rhs.rating_score()),
            Self::Grabbed => grabbed_at(lhs).cmp(&grabbed_at(rhs)),
            Self::Size => {
                lhs.size_on_disk.unwrap_or(0).cmp(&rhs.size_on_disk.unwrap_or(0))
            }
            Self::Release => {
                let sentinel = DateTime::<Utc>::MIN_UTC;
                lhs.digital_release
                    .unwrap_or(sentinel)
                    .cmp(&rhs.digital_release.unwrap_or(sentinel))
            }
        }
    }
}

fn grabbed_at(movie: &Movie) -> DateTime<Utc> {
    movie
        .movie_file
        .as_ref()
        .map(|f| f.date_added)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Year => write!(f, "year"),
            Self::Added => write!(f, "added"),
            Self::Rating => write!(f, "rating"),
            Self::Grabbed => write!(f, "grabbed"),
            Self::Size => write!(f, "size"),
            Self::Release => write!(f, "release"),
        }
    }
}

impl std::str::FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "year" => Ok(Self::Year),
            "added" => Ok(Self::Added),
            "rating" => Ok(Self::Rating),
            "grabbed" => Ok(Self::Grabbed),
            "size" => Ok(Self::Size),
            "release" => Ok(Self::Release),
            other => Err(format!("unknown sort option: {other}")),
        }
    }
}

/// Mutually exclusive movie categories derived from the monitored,
/// downloaded, and available flags. No other state feeds these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovieFilter {
    All,
    Monitored,
    Unmonitored,
    Downloaded,
    Wanted,
    Missing,
    Dangling,
}

impl MovieFilter {
    pub const ALL: &[MovieFilter] = &[
        MovieFilter::All,
        MovieFilter::Monitored,
        MovieFilter::Unmonitored,
        MovieFilter::Downloaded,
        MovieFilter::Wanted,
        MovieFilter::Missing,
        MovieFilter::Dangling,
    ];

    pub fn matches(&self, movie: &Movie) -> bool {
        match self {
            Self::All => true,
            Self::Monitored => movie.monitored,
            Self::Unmonitored => !movie.monitored,
            Self::Downloaded => movie.has_file,
            Self::Wanted => movie.monitored && !movie.has_file,
            Self::Missing => movie.monitored && !movie.has_file && movie.is_available,
            Self::Dangling => !movie.monitored && !movie.has_file,
        }
    }
}

impl std::fmt::Display for MovieFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Monitored => write!(f, "monitored"),
            Self::Unmonitored => write!(f, "unmonitored"),
            Self::Downloaded => write!(f, "downloaded"),
            Self::Wanted => write!(f, "wanted"),
            Self::Missing => write!(f, "missing"),
            Self::Dangling => write!(f, "dangling"),
        }
    }
}

impl std::str::FromStr for MovieFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "monitored" => Ok(Self::Monitored),
            "unmonitored" => Ok(Self::Unmonitored),
            "downloaded" => Ok(Self::Downloaded),
            "wanted" => Ok(Self::Wanted),
            "missing" => Ok(Self::Missing),
            "dangling" => Ok(Self::Dangling),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// A list view's complete ordering state; serialized by consumers that
/// persist their last-used view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MovieSort {
    pub ascending: bool,
    pub option: SortOption,
    pub filter: MovieFilter,
}

impl Default for MovieSort {
    fn default() -> Self {
        Self {
            ascending: false,
            option: SortOption::Added,
            filter: MovieFilter::All,
        }
    }
}

impl MovieSort {
    /// Drop non-matching movies, then order the rest.
    pub fn apply(&self, movies: &mut Vec<Movie>) {
        movies.retain(|m| self.filter.matches(m));
        movies.sort_by(|a, b| {
            let ordering = self.option.compare(a, b);
            if self.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovieFile, Rating, Ratings};

    fn movie(id: u64, title: &str, year: i32) -> Movie {
        Movie {
            id,
            title: title.into(),
            sort_title: title.to_lowercase(),
            year,
            tmdb_id: 0,
            monitored: false,
            has_file: false,
            is_available: false,
            size_on_disk: None,
            added: "2024-01-01T00:00:00Z".parse().unwrap(),
            ratings: Ratings::default(),
            movie_file: None,
            digital_release: None,
            physical_release: None,
            in_cinemas: None,
        }
    }

    /// Every combination of the three flags driving the filters.
    fn flag_grid() -> Vec<Movie> {
        let mut movies = Vec::new();
        let mut id = 0;
        for monitored in [false, true] {
            for has_file in [false, true] {
                for is_available in [false, true] {
                    id += 1;
                    let mut m = movie(id, "Grid", 2024);
                    m.monitored = monitored;
                    m.has_file = has_file;
                    m.is_available = is_available;
                    movies.push(m);
                }
            }
        }
        movies
    }

    #[test]
    fn test_year_orders_ascending() {
        let older = movie(1, "Heat", 1995);
        let newer = movie(2, "Dune", 2021);
        assert_eq!(SortOption::Year.compare(&older, &newer), Ordering::Less);
        assert_eq!(SortOption::Year.compare(&newer, &older), Ordering::Greater);
    }

    #[test]
    fn test_descending_is_exact_reverse_of_ascending() {
        // keys kept distinct on every criterion so the reverse property
        // is not obscured by stable-sort tie handling
        let mut a = movie(1, "Alien", 1979);
        a.added = "2024-01-01T00:00:00Z".parse().unwrap();
        a.size_on_disk = Some(4_000);
        a.ratings.imdb = Some(Rating { value: 8.5 });
        a.movie_file = Some(MovieFile {
            date_added: "2024-01-05T00:00:00Z".parse().unwrap(),
            size: None,
        });
        a.digital_release = Some("2024-01-10T00:00:00Z".parse().unwrap());

        let mut b = movie(2, "Blade Runner", 1982);
        b.added = "2024-01-02T00:00:00Z".parse().unwrap();
        b.size_on_disk = Some(5_000);
        b.ratings.imdb = Some(Rating { value: 7.0 });
        b.movie_file = Some(MovieFile {
            date_added: "2024-02-01T00:00:00Z".parse().unwrap(),
            size: None,
        });
        b.digital_release = Some("2024-03-01T00:00:00Z".parse().unwrap());

        let mut c = movie(3, "Contact", 1997);
        c.added = "2024-01-03T00:00:00Z".parse().unwrap();

        for option in SortOption::ALL {
            let mut ascending = vec![a.clone(), b.clone(), c.clone()];
            MovieSort {
                ascending: true,
                option: *option,
                filter: MovieFilter::All,
            }
            .apply(&mut ascending);

            let mut descending = vec![a.clone(), b.clone(), c.clone()];
            MovieSort {
                ascending: false,
                option: *option,
                filter: MovieFilter::All,
            }
            .apply(&mut descending);

            let reversed: Vec<u64> = descending.iter().rev().map(|m| m.id).collect();
            let forward: Vec<u64> = ascending.iter().map(|m| m.id).collect();
            assert_eq!(forward, reversed, "criterion {option}");
        }
    }

    #[test]
    fn test_missing_grab_and_release_sort_first() {
        let bare = movie(1, "Bare", 2024);
        let mut grabbed = movie(2, "Grabbed", 2024);
        grabbed.movie_file = Some(MovieFile {
            date_added: "2024-02-01T00:00:00Z".parse().unwrap(),
            size: None,
        });
        assert_eq!(SortOption::Grabbed.compare(&bare, &grabbed), Ordering::Less);

        let mut released = movie(3, "Released", 2024);
        released.digital_release = Some("2024-03-01T00:00:00Z".parse().unwrap());
        assert_eq!(SortOption::Release.compare(&bare, &released), Ordering::Less);

        let mut sized = movie(4, "Sized", 2024);
        sized.size_on_disk = Some(1);
        assert_eq!(SortOption::Size.compare(&bare, &sized), Ordering::Less);
    }

    #[test]
    fn test_wanted_is_superset_of_missing() {
        for m in flag_grid() {
            if MovieFilter::Missing.matches(&m) {
                assert!(MovieFilter::Wanted.matches(&m), "movie {}", m.id);
            }
        }
    }

    #[test]
    fn test_dangling_excludes_monitored() {
        for m in flag_grid() {
            assert!(
                !(MovieFilter::Dangling.matches(&m) && MovieFilter::Monitored.matches(&m)),
                "movie {}",
                m.id
            );
        }
    }

    #[test]
    fn test_filter_apply_retains_matches_only() {
        let mut movies = flag_grid();
        MovieSort {
            ascending: true,
            option: SortOption::Title,
            filter: MovieFilter::Downloaded,
        }
        .apply(&mut movies);

        assert!(!movies.is_empty());
        assert!(movies.iter().all(|m| m.has_file));
    }

    #[test]
    fn test_sort_state_serde_roundtrip() {
        let sort = MovieSort {
            ascending: true,
            option: SortOption::Release,
            filter: MovieFilter::Wanted,
        };
        let json = serde_json::to_string(&sort).unwrap();
        assert!(json.contains("\"release\""));
        let back: MovieSort = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sort);
    }

    #[test]
    fn test_option_and_filter_parse_roundtrip() {
        for option in SortOption::ALL {
            let parsed: SortOption = option.to_string().parse().unwrap();
            assert_eq!(parsed, *option);
        }
        for filter in MovieFilter::ALL {
            let parsed: MovieFilter = filter.to_string().parse().unwrap();
            assert_eq!(parsed, *filter);
        }
        assert!("popularity".parse::<SortOption>().is_err());
    }
}
