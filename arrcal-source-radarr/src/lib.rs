use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use arrcal_core::error::{ArrcalError, Result};
use arrcal_core::models::{Instance, Movie, MovieFile, Rating, Ratings, ReleaseBatch};
use arrcal_core::sources::CalendarSource;

pub fn create_source(instance: Instance, client: reqwest::Client) -> Arc<dyn CalendarSource> {
    Arc::new(RadarrClient::new(instance, client))
}

pub struct RadarrClient {
    instance: Instance,
    client: reqwest::Client,
}

impl RadarrClient {
    pub fn new(instance: Instance, client: reqwest::Client) -> Self {
        Self { instance, client }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/v3/{path}",
            self.instance.url.as_str().trim_end_matches('/')
        )
    }

    /// Movies with a release event inside the inclusive day range.
    pub async fn movie_calendar(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Movie>> {
        let response = self
            .client
            .get(self.endpoint("calendar"))
            .header("X-Api-Key", &self.instance.api_key)
            .query(&[
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("unmonitored", "true".into()),
            ])
            .send()
            .await?;

        let movies: Vec<RadarrMovie> = check(response, &self.instance).await?.json().await?;
        Ok(movies.into_iter().map(RadarrMovie::into_movie).collect())
    }

    /// The whole library, used by list views rather than the calendar.
    pub async fn movie_catalog(&self) -> Result<Vec<Movie>> {
        let response = self
            .client
            .get(self.endpoint("movie"))
            .header("X-Api-Key", &self.instance.api_key)
            .send()
            .await?;

        let movies: Vec<RadarrMovie> = check(response, &self.instance).await?.json().await?;
        Ok(movies.into_iter().map(RadarrMovie::into_movie).collect())
    }
}

async fn check(response: reqwest::Response, instance: &Instance) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(ArrcalError::Remote {
            instance: instance.name.clone(),
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response)
}

#[async_trait]
impl CalendarSource for RadarrClient {
    fn instance(&self) -> &Instance {
        &self.instance
    }

    async fn releases(&self, start: NaiveDate, end: NaiveDate) -> Result<ReleaseBatch> {
        Ok(ReleaseBatch::Movies(self.movie_calendar(start, end).await?))
    }
}

// -- API response types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadarrMovie {
    id: u64,
    title: String,
    sort_title: String,
    year: i32,
    #[serde(default)]
    tmdb_id: u64,
    monitored: bool,
    #[serde(default)]
    has_file: bool,
    #[serde(default)]
    is_available: bool,
    #[serde(default)]
    size_on_disk: Option<u64>,
    added: DateTime<Utc>,
    #[serde(default)]
    ratings: RadarrRatings,
    #[serde(default)]
    movie_file: Option<RadarrMovieFile>,
    #[serde(default)]
    digital_release: Option<DateTime<Utc>>,
    #[serde(default)]
    physical_release: Option<DateTime<Utc>>,
    #[serde(default)]
    in_cinemas: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct RadarrRatings {
    #[serde(default)]
    imdb: Option<RadarrRating>,
    #[serde(default)]
    tmdb: Option<RadarrRating>,
}

#[derive(Debug, Deserialize)]
struct RadarrRating {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadarrMovieFile {
    date_added: DateTime<Utc>,
    #[serde(default)]
    size: Option<u64>,
}

impl RadarrMovie {
    fn into_movie(self) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            sort_title: self.sort_title,
            year: self.year,
            tmdb_id: self.tmdb_id,
            monitored: self.monitored,
            has_file: self.has_file,
            is_available: self.is_available,
            size_on_disk: self.size_on_disk,
            added: self.added,
            ratings: Ratings {
                imdb: self.ratings.imdb.map(|r| Rating { value: r.value }),
                tmdb: self.ratings.tmdb.map(|r| Rating { value: r.value }),
            },
            movie_file: self.movie_file.map(|f| MovieFile {
                date_added: f.date_added,
                size: f.size,
            }),
            digital_release: self.digital_release,
            physical_release: self.physical_release,
            in_cinemas: self.in_cinemas,
        }
    }
}
