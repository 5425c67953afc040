use std::time::Duration;

use landcover_core::geocode::{should_suggest, FeatureCollection, Place, SUGGESTION_LIMIT};
use reqwest::Url;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("empty search query")]
    EmptyQuery,

    #[error("Location not found. Please try a different search term.")]
    NotFound,

    #[error("Search failed. Please try again.")]
    Transient(#[source] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("invalid geocoder URL {0:?}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Client for a Photon-compatible geocoder.
#[derive(Clone)]
pub struct LocationSearch {
    client: reqwest::Client,
    endpoint: Url,
}

impl LocationSearch {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SetupError> {
        let raw = format!("{}/api", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|_| SetupError::InvalidUrl(base_url.to_string()))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Up to five places for a partial query. Short queries and failed
    /// requests both yield an empty list.
    pub async fn suggest(&self, query: &str) -> Vec<Place> {
        if !should_suggest(query) {
            return Vec::new();
        }
        match self.lookup(query, SUGGESTION_LIMIT).await {
            Ok(fc) => fc.features.iter().take(SUGGESTION_LIMIT).map(Place::from).collect(),
            Err(e) => {
                tracing::warn!("suggestion lookup for {query:?} failed: {e}");
                Vec::new()
            }
        }
    }

    /// Best single match for a submitted query.
    pub async fn search(&self, query: &str) -> Result<Place, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let fc = self.lookup(query, 1).await.map_err(|e| {
            tracing::error!("search for {query:?} failed: {e}");
            SearchError::Transient(e)
        })?;
        fc.features
            .first()
            .map(Place::from)
            .ok_or(SearchError::NotFound)
    }

    async fn lookup(&self, query: &str, limit: usize) -> Result<FeatureCollection, reqwest::Error> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string())
            .append_pair("lang", "en");
        tracing::debug!("geocoding {url}");
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<FeatureCollection>()
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    async fn client() -> (fake::FakeGeocoder, LocationSearch) {
        let geocoder = fake::spawn().await;
        let search = LocationSearch::new(&geocoder.url, Duration::from_secs(5)).unwrap();
        (geocoder, search)
    }

    #[tokio::test]
    async fn test_short_query_makes_no_request() {
        let (geocoder, search) = client().await;
        assert!(search.suggest("a").await.is_empty());
        assert!(search.suggest("ab").await.is_empty());
        assert!(search.suggest("    ").await.is_empty());
        assert_eq!(geocoder.hits(), 0);
    }

    #[tokio::test]
    async fn test_padded_short_query_is_sent_as_typed() {
        let (geocoder, search) = client().await;
        assert!(search.suggest(" ab").await.is_empty());
        assert_eq!(geocoder.hits(), 1);
    }

    #[tokio::test]
    async fn test_suggest_caps_results() {
        let (geocoder, search) = client().await;
        let places = search.suggest("Dhaka").await;
        assert!(!places.is_empty());
        assert!(places.len() <= SUGGESTION_LIMIT);
        assert_eq!(places[0].name, "Dhaka 0");
        assert_eq!(places[0].label, "Dhaka 0, Dhaka Division, Bangladesh");
        assert_eq!(places[0].lat, 23.81);
        assert_eq!(geocoder.hits(), 1);
    }

    #[tokio::test]
    async fn test_suggest_swallows_failures() {
        let (geocoder, search) = client().await;
        assert!(search.suggest("boom").await.is_empty());
        assert!(search.suggest("garbage").await.is_empty());
        assert_eq!(geocoder.hits(), 2);
    }

    #[tokio::test]
    async fn test_search_outcomes() {
        let (geocoder, search) = client().await;
        assert!(matches!(search.search("   ").await, Err(SearchError::EmptyQuery)));
        assert_eq!(geocoder.hits(), 0);

        let place = search.search("Dhaka").await.unwrap();
        assert_eq!(place.lon, 90.41);

        let err = search.search("Atlantis").await.unwrap_err();
        assert!(matches!(err, SearchError::NotFound));
        assert_eq!(
            err.to_string(),
            "Location not found. Please try a different search term."
        );

        let err = search.search("boom").await.unwrap_err();
        assert!(matches!(err, SearchError::Transient(_)));
        assert_eq!(err.to_string(), "Search failed. Please try again.");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            LocationSearch::new("not a url", Duration::from_secs(1)),
            Err(SetupError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_is_transient() {
        let search = LocationSearch::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            search.search("Dhaka").await,
            Err(SearchError::Transient(_))
        ));
    }
}
