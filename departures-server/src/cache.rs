//! Caching layer for Transport API responses.
//!
//! Every widget refresh asks for the same couple of boards, and the
//! provider meters requests per app key. Boards are cached briefly, keyed
//! by what was asked for; only successful fetches are stored.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{ApiCredentials, AtcoCode, Crs};
use crate::transport_api::{BusTimetable, TrainBoard, TransportApiClient, TransportApiError};

/// Cache key: which board was requested, and under which app id.
///
/// The provider meters by app id, so installations never share entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoardKey {
    Bus { app_id: String, stop: AtcoCode },
    Train { app_id: String, station: Crs },
}

/// Cached board entry.
#[derive(Debug, Clone)]
pub enum BoardEntry {
    Bus(Arc<BusTimetable>),
    Train(Arc<TrainBoard>),
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Cache for board responses.
pub struct BoardCache {
    boards: MokaCache<BoardKey, BoardEntry>,
}

impl BoardCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { boards }
    }

    pub async fn get_bus(&self, app_id: &str, stop: &AtcoCode) -> Option<Arc<BusTimetable>> {
        let key = BoardKey::Bus {
            app_id: app_id.to_string(),
            stop: stop.clone(),
        };
        match self.boards.get(&key).await {
            Some(BoardEntry::Bus(timetable)) => Some(timetable),
            _ => None,
        }
    }

    pub async fn get_train(&self, app_id: &str, station: &Crs) -> Option<Arc<TrainBoard>> {
        let key = BoardKey::Train {
            app_id: app_id.to_string(),
            station: *station,
        };
        match self.boards.get(&key).await {
            Some(BoardEntry::Train(board)) => Some(board),
            _ => None,
        }
    }

    pub async fn insert_bus(&self, app_id: &str, stop: AtcoCode, timetable: Arc<BusTimetable>) {
        let key = BoardKey::Bus {
            app_id: app_id.to_string(),
            stop,
        };
        self.boards.insert(key, BoardEntry::Bus(timetable)).await;
    }

    pub async fn insert_train(&self, app_id: &str, station: Crs, board: Arc<TrainBoard>) {
        let key = BoardKey::Train {
            app_id: app_id.to_string(),
            station,
        };
        self.boards.insert(key, BoardEntry::Train(board)).await;
    }
}

/// Transport API client with caching.
///
/// Wraps a `TransportApiClient` and caches board responses.
pub struct CachedTransportApi {
    client: TransportApiClient,
    cache: BoardCache,
}

impl CachedTransportApi {
    /// Create a new cached client.
    pub fn new(client: TransportApiClient, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: BoardCache::new(cache_config),
        }
    }

    /// Get a bus stop timetable, using cache if available.
    pub async fn bus_timetable(
        &self,
        credentials: &ApiCredentials,
        stop: &AtcoCode,
    ) -> Result<Arc<BusTimetable>, TransportApiError> {
        if let Some(cached) = self.cache.get_bus(&credentials.app_id, stop).await {
            debug!(stop = stop.as_str(), "bus timetable cache hit");
            return Ok(cached);
        }

        let timetable = Arc::new(self.client.bus_timetable(credentials, stop).await?);
        self.cache
            .insert_bus(&credentials.app_id, stop.clone(), timetable.clone())
            .await;

        Ok(timetable)
    }

    /// Get a live train board, using cache if available.
    pub async fn train_board(
        &self,
        credentials: &ApiCredentials,
        station: &Crs,
    ) -> Result<Arc<TrainBoard>, TransportApiError> {
        if let Some(cached) = self.cache.get_train(&credentials.app_id, station).await {
            debug!(station = station.as_str(), "train board cache hit");
            return Ok(cached);
        }

        let board = Arc::new(self.client.train_board(credentials, station).await?);
        self.cache
            .insert_train(&credentials.app_id, *station, board.clone())
            .await;

        Ok(board)
    }

    #[cfg(test)]
    fn cache(&self) -> &BoardCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport_api::{DemoBoards, TransportApiConfig};

    fn unreachable_client() -> TransportApiClient {
        let config = TransportApiConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(2);
        TransportApiClient::new(config).unwrap()
    }

    fn creds() -> ApiCredentials {
        ApiCredentials {
            app_id: "id".into(),
            app_key: "key".into(),
        }
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn bus_and_train_keys_do_not_collide() {
        let cache = BoardCache::new(&CacheConfig::default());
        let demo = DemoBoards::embedded().unwrap();

        let stop = AtcoCode::parse("450010441").unwrap();
        let station = Crs::parse("LST").unwrap();
        cache.insert_bus("id", stop.clone(), Arc::new(demo.bus)).await;

        assert!(cache.get_bus("id", &stop).await.is_some());
        assert!(cache.get_train("id", &station).await.is_none());

        cache.insert_train("id", station, Arc::new(demo.train)).await;
        assert!(cache.get_bus("id", &stop).await.is_some());
        assert!(cache.get_train("id", &station).await.is_some());
    }

    #[tokio::test]
    async fn boards_are_not_shared_between_app_ids() {
        let cache = BoardCache::new(&CacheConfig::default());
        let station = Crs::parse("NRW").unwrap();
        cache
            .insert_train("first-app", station, Arc::new(TrainBoard::default()))
            .await;

        assert!(cache.get_train("first-app", &station).await.is_some());
        assert!(cache.get_train("second-app", &station).await.is_none());
    }

    #[tokio::test]
    async fn cached_board_served_without_fetching() {
        // The client cannot reach anything, so a success proves a cache hit
        let api = CachedTransportApi::new(unreachable_client(), &CacheConfig::default());
        let demo = DemoBoards::embedded().unwrap();
        let station = Crs::parse("LST").unwrap();
        api.cache()
            .insert_train("id", station, Arc::new(demo.train))
            .await;

        let board = api.train_board(&creds(), &station).await.unwrap();
        assert_eq!(board.departures.all.len(), 4);
    }

    #[tokio::test]
    async fn other_app_id_misses_and_fetches() {
        let api = CachedTransportApi::new(unreachable_client(), &CacheConfig::default());
        let station = Crs::parse("LST").unwrap();
        api.cache()
            .insert_train("someone-else", station, Arc::new(TrainBoard::default()))
            .await;

        assert!(api.train_board(&creds(), &station).await.is_err());
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let api = CachedTransportApi::new(unreachable_client(), &CacheConfig::default());
        let stop = AtcoCode::parse("450010441").unwrap();

        assert!(api.bus_timetable(&creds(), &stop).await.is_err());
        assert!(api.cache().get_bus("id", &stop).await.is_none());
    }
}
