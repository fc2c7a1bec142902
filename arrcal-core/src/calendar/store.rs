use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Episode, Movie, ReleaseBatch};

/// UTC calendar day a timestamp falls on. All bucketing uses UTC so the
/// axis is stable regardless of where the process runs.
pub fn day_of(when: DateTime<Utc>) -> NaiveDate {
    when.date_naive()
}

/// Day-indexed collections of deduplicated releases. Buckets keep
/// arrival order; entries only leave through `reset`.
#[derive(Debug, Default)]
pub struct CalendarStore {
    movies: HashMap<NaiveDate, Vec<Movie>>,
    episodes: HashMap<NaiveDate, Vec<Episode>>,
}

impl CalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-update keyed by movie id within the day bucket of
    /// `when`. An identical entry is left untouched so downstream
    /// consumers see no spurious change.
    pub fn upsert_movie(&mut self, movie: &Movie, when: DateTime<Utc>) {
        let bucket = self.movies.entry(day_of(when)).or_default();

        match bucket.iter_mut().find(|m| m.id == movie.id) {
            None => bucket.push(movie.clone()),
            Some(existing) if *existing != *movie => *existing = movie.clone(),
            Some(_) => {}
        }
    }

    pub fn upsert_episode(&mut self, episode: &Episode, when: DateTime<Utc>) {
        let bucket = self.episodes.entry(day_of(when)).or_default();

        match bucket.iter_mut().find(|e| e.id == episode.id) {
            None => bucket.push(episode.clone()),
            Some(existing) if *existing != *episode => *existing = episode.clone(),
            Some(_) => {}
        }
    }

    /// Merge one instance's results. A movie lands under every release
    /// date it carries, so three distinct dates mean three buckets.
    pub fn apply(&mut self, batch: &ReleaseBatch) {
        match batch {
            ReleaseBatch::Movies(movies) => {
                for movie in movies {
                    for when in movie.release_dates() {
                        self.upsert_movie(movie, when);
                    }
                }
            }
            ReleaseBatch::Episodes(episodes) => {
                for episode in episodes {
                    if let Some(aired) = episode.air_date_utc {
                        self.upsert_episode(episode, aired);
                    }
                }
            }
        }
    }

    pub fn movies_on(&self, day: NaiveDate) -> &[Movie] {
        self.movies.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn episodes_on(&self, day: NaiveDate) -> &[Episode] {
        self.episodes.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn movie_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.movies.keys().copied()
    }

    pub fn episode_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.episodes.keys().copied()
    }

    pub fn reset(&mut self) {
        self.movies.clear();
        self.episodes.clear();
    }
}
