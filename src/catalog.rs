use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub type ShowId = u32;
pub type EpisodeId = u32;

/// Poster URLs attached to shows and episodes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Image {
    pub medium: Option<String>,
    pub original: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Rating {
    pub average: Option<f64>,
}

/// A series record from the `/shows` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Show {
    pub id: ShowId,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default, deserialize_with = "optional_date")]
    pub premiered: Option<NaiveDate>,
    #[serde(default)]
    pub language: Option<String>,
}

/// A single episode from `/shows/{id}/episodes`.
///
/// Specials carry no episode `number`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub season: u32,
    #[serde(default)]
    pub number: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default, deserialize_with = "optional_date")]
    pub airdate: Option<NaiveDate>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

impl Image {
    fn preferred_url(&self) -> Option<&str> {
        self.medium.as_deref().or(self.original.as_deref())
    }
}

impl Show {
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(Image::preferred_url)
    }
}

impl Episode {
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(Image::preferred_url)
    }
}

// The API sends `""` for unknown dates.
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Errors surfaced by catalog requests. None of them are retried.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Http(e) if e.is_timeout() => "Network timeout".to_string(),
            CatalogError::Http(e) => format!("Network error: {}", e),
            CatalogError::Status { status, .. } => format!("Catalog API error (HTTP {})", status),
            CatalogError::Decode { .. } => "Catalog API returned unexpected data".to_string(),
        }
    }
}

/// Where raw show and episode collections come from.
pub trait CatalogSource: Send + Sync {
    fn fetch_shows(&self) -> impl Future<Output = Result<Vec<Show>, CatalogError>> + Send;

    fn fetch_episodes(
        &self,
        show_id: ShowId,
    ) -> impl Future<Output = Result<Vec<Episode>, CatalogError>> + Send;
}

/// `CatalogSource` backed by the TVmaze HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("show-explorer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn shows_url(&self) -> String {
        format!("{}/shows", self.base_url)
    }

    pub fn episodes_url(&self, show_id: ShowId) -> String {
        format!("{}/shows/{}/episodes", self.base_url, show_id)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, CatalogError> {
        tracing::info!(%url, "fetching");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return decode_body(url, status, "");
        }
        let body = response.text().await?;
        decode_body(url, status, &body)
    }
}

/// Map a finished response to a typed body: non-2xx is `Status`, a body
/// that fails to parse is `Decode`.
fn decode_body<T: serde::de::DeserializeOwned>(
    url: String,
    status: reqwest::StatusCode,
    body: &str,
) -> Result<T, CatalogError> {
    if !status.is_success() {
        return Err(CatalogError::Status {
            url,
            status: status.as_u16(),
        });
    }
    serde_json::from_str(body).map_err(|source| CatalogError::Decode { url, source })
}

impl CatalogSource for HttpCatalog {
    async fn fetch_shows(&self) -> Result<Vec<Show>, CatalogError> {
        self.get_json(self.shows_url()).await
    }

    async fn fetch_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, CatalogError> {
        self.get_json(self.episodes_url(show_id)).await
    }
}

/// Stable sort by lower-cased name.
pub fn sort_shows(shows: &mut [Show]) {
    shows.sort_by_cached_key(|s| s.name.to_lowercase());
}

/// Session-lifetime memoizing client.
///
/// Both caches are append-only: an entry is stored on its first successful
/// fetch and handed out unchanged afterwards. Concurrent misses for the same
/// key are not merged; each issues its own request and the first stored
/// value wins.
pub struct CatalogClient<S = HttpCatalog> {
    source: S,
    shows: Mutex<Option<Arc<Vec<Show>>>>,
    episodes: Mutex<HashMap<ShowId, Arc<Vec<Episode>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: CatalogSource> CatalogClient<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            shows: Mutex::new(None),
            episodes: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_shows(&self) -> Option<Arc<Vec<Show>>> {
        lock(&self.shows).clone()
    }

    pub fn cached_episodes(&self, show_id: ShowId) -> Option<Arc<Vec<Episode>>> {
        lock(&self.episodes).get(&show_id).cloned()
    }

    /// All shows sorted by name. Fetches on first use only.
    pub async fn get_shows(&self) -> Result<Arc<Vec<Show>>, CatalogError> {
        if let Some(shows) = self.cached_shows() {
            tracing::debug!("shows cache hit");
            return Ok(shows);
        }

        let mut fetched = self.source.fetch_shows().await?;
        sort_shows(&mut fetched);
        tracing::info!(count = fetched.len(), "shows loaded");

        let mut slot = lock(&self.shows);
        Ok(Arc::clone(slot.get_or_insert_with(|| Arc::new(fetched))))
    }

    /// Episodes for one show in API order. Fetches once per show id.
    pub async fn get_episodes(&self, show_id: ShowId) -> Result<Arc<Vec<Episode>>, CatalogError> {
        if let Some(episodes) = self.cached_episodes(show_id) {
            tracing::debug!(show_id, "episodes cache hit");
            return Ok(episodes);
        }

        let fetched = self.source.fetch_episodes(show_id).await?;
        tracing::info!(show_id, count = fetched.len(), "episodes loaded");

        let mut cache = lock(&self.episodes);
        Ok(Arc::clone(
            cache.entry(show_id).or_insert_with(|| Arc::new(fetched)),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub fn show(id: ShowId, name: &str) -> Show {
        Show {
            id,
            name: name.to_string(),
            summary: None,
            genres: Vec::new(),
            status: "Ended".to_string(),
            rating: Rating::default(),
            runtime: Some(60),
            image: None,
            premiered: None,
            language: None,
        }
    }

    pub fn episode(id: EpisodeId, season: u32, number: u32, name: &str) -> Episode {
        Episode {
            id,
            season,
            number: Some(number),
            name: name.to_string(),
            summary: None,
            image: None,
            airdate: None,
            runtime: None,
        }
    }

    /// In-memory source that counts how often it is asked.
    #[derive(Default)]
    pub struct CountingSource {
        pub shows: Vec<Show>,
        pub episodes: HashMap<ShowId, Vec<Episode>>,
        pub show_calls: AtomicUsize,
        pub episode_calls: AtomicUsize,
        pub fail: bool,
        /// Holds every fetch open this long so concurrent calls overlap.
        pub delay: Option<Duration>,
    }

    impl CountingSource {
        async fn pause(&self) {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    impl CatalogSource for CountingSource {
        async fn fetch_shows(&self) -> Result<Vec<Show>, CatalogError> {
            self.show_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            if self.fail {
                return Err(CatalogError::Status {
                    url: "test://shows".to_string(),
                    status: 503,
                });
            }
            Ok(self.shows.clone())
        }

        async fn fetch_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, CatalogError> {
            self.episode_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            if self.fail {
                return Err(CatalogError::Status {
                    url: format!("test://shows/{}/episodes", show_id),
                    status: 503,
                });
            }
            Ok(self.episodes.get(&show_id).cloned().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_get_shows_sorts_by_name() {
        let source = CountingSource {
            shows: vec![show(1, "Lost"), show(2, "Alias")],
            ..Default::default()
        };
        let client = CatalogClient::new(source);

        let shows = client.get_shows().await.unwrap();
        let names: Vec<&str> = shows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alias", "Lost"]);
    }

    #[tokio::test]
    async fn test_get_shows_sort_ignores_case() {
        let source = CountingSource {
            shows: vec![show(1, "bones"), show(2, "Arrow"), show(3, "community"), show(4, "Castle")],
            ..Default::default()
        };
        let client = CatalogClient::new(source);

        let shows = client.get_shows().await.unwrap();
        let names: Vec<&str> = shows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Arrow", "bones", "Castle", "community"]);
    }

    #[tokio::test]
    async fn test_get_shows_is_cached() {
        let client = CatalogClient::new(CountingSource {
            shows: vec![show(1, "Lost")],
            ..Default::default()
        });

        let first = client.get_shows().await.unwrap();
        let second = client.get_shows().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(client.source.show_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_episodes_cached_per_show() {
        let mut episodes = HashMap::new();
        episodes.insert(1, vec![episode(10, 1, 1, "Pilot")]);
        episodes.insert(2, vec![episode(20, 1, 1, "Truth Be Told")]);
        let client = CatalogClient::new(CountingSource {
            episodes,
            ..Default::default()
        });

        let a1 = client.get_episodes(1).await.unwrap();
        let a2 = client.get_episodes(1).await.unwrap();
        let b = client.get_episodes(2).await.unwrap();

        assert!(Arc::ptr_eq(&a1, &a2));
        assert_eq!(b[0].name, "Truth Be Told");
        assert_eq!(client.source.episode_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_episodes_keeps_api_order() {
        let mut episodes = HashMap::new();
        episodes.insert(
            7,
            vec![episode(3, 2, 1, "Zeta"), episode(1, 1, 1, "Alpha")],
        );
        let client = CatalogClient::new(CountingSource {
            episodes,
            ..Default::default()
        });

        let got = client.get_episodes(7).await.unwrap();
        assert_eq!(got[0].name, "Zeta");
        assert_eq!(got[1].name, "Alpha");
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let client = CatalogClient::new(CountingSource {
            fail: true,
            ..Default::default()
        });

        assert!(client.get_shows().await.is_err());
        assert!(client.get_shows().await.is_err());
        assert!(client.cached_shows().is_none());
        assert_eq!(client.source.show_calls.load(Ordering::SeqCst), 2);

        assert!(client.get_episodes(5).await.is_err());
        assert!(client.cached_episodes(5).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_first_stored_value() {
        let mut episodes = HashMap::new();
        episodes.insert(1, vec![episode(10, 1, 1, "Pilot")]);
        let client = CatalogClient::new(CountingSource {
            shows: vec![show(1, "Lost")],
            episodes,
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });

        let (a, b) = tokio::join!(client.get_shows(), client.get_shows());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &client.cached_shows().unwrap()));
        assert_eq!(client.source.show_calls.load(Ordering::SeqCst), 2);

        let (a, b) = tokio::join!(client.get_episodes(1), client.get_episodes(1));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &client.cached_episodes(1).unwrap()));
        assert_eq!(client.source.episode_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_decode_body_maps_status() {
        for code in [404, 503] {
            let status = reqwest::StatusCode::from_u16(code).unwrap();
            let err = decode_body::<Vec<Show>>("https://api.tvmaze.com/shows".to_string(), status, "[]")
                .unwrap_err();
            match err {
                CatalogError::Status { url, status } => {
                    assert_eq!(url, "https://api.tvmaze.com/shows");
                    assert_eq!(status, code);
                }
                other => panic!("expected Status, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_body_maps_malformed_json() {
        let err = decode_body::<Vec<Episode>>(
            "https://api.tvmaze.com/shows/1/episodes".to_string(),
            reqwest::StatusCode::OK,
            "not json",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Decode { ref url, .. } if url.ends_with("/episodes")));
        assert_eq!(err.user_message(), "Catalog API returned unexpected data");
    }

    #[test]
    fn test_decode_body_ok() {
        let shows: Vec<Show> = decode_body(
            "https://api.tvmaze.com/shows".to_string(),
            reqwest::StatusCode::OK,
            r#"[{"id": 1, "name": "Lost"}]"#,
        )
        .unwrap();
        assert_eq!(shows[0].name, "Lost");
    }

    #[test]
    fn test_decode_show_with_missing_fields() {
        let json = r#"[{
            "id": 1,
            "name": "Under the Dome",
            "genres": ["Drama", "Science-Fiction"],
            "status": "Ended",
            "runtime": null,
            "premiered": "2013-06-24",
            "rating": {"average": null},
            "image": null,
            "summary": null
        }]"#;
        let shows: Vec<Show> = serde_json::from_str(json).unwrap();
        let s = &shows[0];
        assert_eq!(s.runtime, None);
        assert_eq!(s.rating.average, None);
        assert_eq!(s.image_url(), None);
        assert_eq!(s.premiered, NaiveDate::from_ymd_opt(2013, 6, 24));
    }

    #[test]
    fn test_decode_episode_special_with_empty_airdate() {
        let json = r#"{
            "id": 99,
            "name": "Behind the Scenes",
            "season": 1,
            "number": null,
            "airdate": "",
            "summary": "<p>Making of.</p>",
            "image": {"medium": "http://img/m.jpg", "original": "http://img/o.jpg"}
        }"#;
        let ep: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(ep.number, None);
        assert_eq!(ep.airdate, None);
        assert_eq!(ep.image_url(), Some("http://img/m.jpg"));
    }

    #[test]
    fn test_http_catalog_urls() {
        let catalog = HttpCatalog::new("https://api.tvmaze.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(catalog.shows_url(), "https://api.tvmaze.com/shows");
        assert_eq!(catalog.episodes_url(82), "https://api.tvmaze.com/shows/82/episodes");
    }

    #[test]
    fn test_catalog_error_user_message() {
        let err = CatalogError::Status {
            url: "https://api.tvmaze.com/shows".to_string(),
            status: 429,
        };
        assert!(err.user_message().contains("429"));
    }
}
