//! Recommendation cache module

pub mod recommendation_cache;

pub use recommendation_cache::{
    CacheEntry, CacheKey, CacheLookup, MissReason, RecommendationCache,
};
