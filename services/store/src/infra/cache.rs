use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::domain::builder::BuilderReply;
use crate::domain::repository::BuilderCache;
use crate::domain::types::CatalogEntry;

/// Upper bound on cached builder replies.
const MAX_CACHED_REPLIES: u64 = 1_000;

/// Builder caches held in process memory. Cloning shares the underlying
/// caches.
#[derive(Clone)]
pub struct MokaBuilderCache {
    snapshot: Cache<(), Arc<Vec<CatalogEntry>>>,
    replies: Cache<String, BuilderReply>,
}

impl MokaBuilderCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            snapshot: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            replies: Cache::builder()
                .max_capacity(MAX_CACHED_REPLIES)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl BuilderCache for MokaBuilderCache {
    fn snapshot(&self) -> Option<Arc<Vec<CatalogEntry>>> {
        self.snapshot.get(&())
    }

    fn store_snapshot(&self, snapshot: Arc<Vec<CatalogEntry>>) {
        self.snapshot.insert((), snapshot);
    }

    fn reply(&self, key: &str) -> Option<BuilderReply> {
        self.replies.get(key)
    }

    fn store_reply(&self, key: String, reply: BuilderReply) {
        self.replies.insert(key, reply);
    }
}
