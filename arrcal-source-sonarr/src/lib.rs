use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use arrcal_core::error::{ArrcalError, Result};
use arrcal_core::models::{Episode, Instance, ReleaseBatch};
use arrcal_core::sources::CalendarSource;

pub fn create_source(instance: Instance, client: reqwest::Client) -> Arc<dyn CalendarSource> {
    Arc::new(SonarrClient::new(instance, client))
}

pub struct SonarrClient {
    instance: Instance,
    client: reqwest::Client,
}

impl SonarrClient {
    pub fn new(instance: Instance, client: reqwest::Client) -> Self {
        Self { instance, client }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/v3/{path}",
            self.instance.url.as_str().trim_end_matches('/')
        )
    }

    /// Episodes airing inside the inclusive day range. The series is
    /// requested embedded so list views can show its title.
    pub async fn episode_calendar(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Episode>> {
        let response = self
            .client
            .get(self.endpoint("calendar"))
            .header("X-Api-Key", &self.instance.api_key)
            .query(&[
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("unmonitored", "true".into()),
                ("includeSeries", "true".into()),
            ])
            .send()
            .await?;

        let episodes: Vec<SonarrEpisode> = check(response, &self.instance).await?.json().await?;
        Ok(episodes.into_iter().map(SonarrEpisode::into_episode).collect())
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
impl CalendarSource for SonarrClient {
    fn instance(&self) -> &Instance {
        &self.instance
    }

    async fn releases(&self, start: NaiveDate, end: NaiveDate) -> Result<ReleaseBatch> {
        Ok(ReleaseBatch::Episodes(
            self.episode_calendar(start, end).await?,
        ))
    }
}

// -- API response types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SonarrEpisode {
    id: u64,
    series_id: u64,
    season_number: u32,
    episode_number: u32,
    #[serde(default)]
    title: Option<String>,
    monitored: bool,
    #[serde(default)]
    has_file: bool,
    #[serde(default)]
    air_date_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    series: Option<SonarrSeries>,
}

#[derive(Debug, Deserialize)]
struct SonarrSeries {
    title: String,
}

impl SonarrEpisode {
    fn into_episode(self) -> Episode {
        Episode {
            id: self.id,
            series_id: self.series_id,
            season_number: self.season_number,
            episode_number: self.episode_number,
            title: self.title,
            series_title: self.series.map(|s| s.title),
            monitored: self.monitored,
            has_file: self.has_file,
            air_date_utc: self.air_date_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_RESPONSE: &str = r#"[
        {
            "id": 9001,
            "seriesId": 12,
            "tvdbId": 10441558,
            "episodeFileId": 0,
            "seasonNumber": 2,
            "episodeNumber": 5,
            "title": "Trojan's Horse",
            "airDate": "2025-02-13",
            "airDateUtc": "2025-02-14T02:00:00Z",
            "hasFile": false,
            "monitored": true,
            "unverifiedSceneNumbering": false,
            "series": {
                "id": 12,
                "title": "Severance",
                "status": "continuing",
                "network": "Apple TV+"
            }
        },
        {
            "id": 9002,
            "seriesId": 12,
            "seasonNumber": 2,
            "episodeNumber": 6,
            "monitored": true,
            "hasFile": false
        }
    ]"#;

    #[test]
    fn test_parse_calendar_response() {
        let episodes: Vec<SonarrEpisode> = serde_json::from_str(MOCK_RESPONSE).unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].id, 9001);
        assert_eq!(episodes[0].season_number, 2);
        assert!(episodes[0].air_date_utc.is_some());
        // TBA entry: no air date, no title, no embedded series
        assert!(episodes[1].air_date_utc.is_none());
        assert!(episodes[1].title.is_none());
        assert!(episodes[1].series.is_none());
    }

    #[test]
    fn test_mapping_into_core_episode() {
        let episodes: Vec<SonarrEpisode> = serde_json::from_str(MOCK_RESPONSE).unwrap();
        let episode = episodes.into_iter().next().unwrap().into_episode();

        assert_eq!(episode.series_title.as_deref(), Some("Severance"));
        assert_eq!(episode.title.as_deref(), Some("Trojan's Horse"));
        assert_eq!(
            episode.air_date_utc.unwrap().to_rfc3339(),
            "2025-02-14T02:00:00+00:00"
        );
    }
}
