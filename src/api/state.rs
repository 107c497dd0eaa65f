use std::sync::Arc;

use crate::db::{InMemoryStore, Store};
use crate::services::{
    CatalogService, EventFeed, GraphQueries, LikeService, RankingEngine, RecommendationEngine,
    ReviewService,
};

/// Shared application state
///
/// Every engine wraps the same store, so handlers see one consistent
/// snapshot source regardless of which engine they call.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub ranking: RankingEngine,
    pub graph: GraphQueries,
    pub recommendations: RecommendationEngine,
    pub feed: EventFeed,
    pub likes: LikeService,
    pub reviews: ReviewService,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

impl AppState {
    /// Wires every engine to the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        let feed = EventFeed::new(store.clone());

        Self {
            catalog: CatalogService::new(store.clone()),
            ranking: RankingEngine::new(store.clone()),
            graph: GraphQueries::new(store.clone(), feed.clone()),
            recommendations: RecommendationEngine::new(store.clone()),
            likes: LikeService::new(store.clone(), feed.clone()),
            reviews: ReviewService::new(store, feed.clone()),
            feed,
        }
    }

    /// State over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::default()
    }
}
