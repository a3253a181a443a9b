//! Site-wide communications.
//!
//! The active banner is read on nearly every page load, so lookups go
//! through a short-TTL cache. A cache slot holds the query result even when
//! it was `None`; "no active banner" is just as cacheable as a banner.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::error::ServiceResult;
use gateway_db::db::DbProvider;
use gateway_db::db::enums::CommunicationType;
use gateway_db::db::query::communication;
use gateway_db::model::communication::Communication;

struct CacheSlot {
    value: Option<Communication>,
    fetched_at: Instant,
}

pub struct CommunicationService {
    provider: Arc<dyn DbProvider>,
    ttl: Duration,
    cache: RwLock<HashMap<CommunicationType, CacheSlot>>,
}

impl CommunicationService {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// ## Summary
    /// Returns the active communication of the given type, served from the
    /// cache when fresh.
    ///
    /// ## Errors
    /// Returns database errors on a cache miss.
    pub async fn active(
        &self,
        communication_type: CommunicationType,
    ) -> ServiceResult<Option<Communication>> {
        {
            let cache = self.cache.read().await;
            if let Some(slot) = cache.get(&communication_type) {
                if slot.fetched_at.elapsed() < self.ttl {
                    tracing::trace!(?communication_type, "Communication served from cache");
                    return Ok(slot.value.clone());
                }
            }
        }

        let mut conn = self.provider.get_connection().await?;
        let value = communication::active(&mut conn, communication_type, chrono::Utc::now()).await?;

        let mut cache = self.cache.write().await;
        cache.insert(
            communication_type,
            CacheSlot {
                value: value.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(value)
    }
}
