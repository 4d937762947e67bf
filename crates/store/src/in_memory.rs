//! In-memory profile store — useful for testing and ephemeral deployments.

use async_trait::async_trait;
use airadvisor_core::error::StoreError;
use airadvisor_core::profile::{HealthProfile, ProfileStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Profiles in a `HashMap` behind an async `RwLock`. Each save replaces the
/// whole value under the write lock, so readers never see a partial row.
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, HealthProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    fn name(&self) -> &str { "in_memory" }

    async fn save(&self, profile: HealthProfile) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .insert(profile.name.clone(), profile);
        Ok(())
    }

    async fn find(&self, name: &str) -> Result<Option<HealthProfile>, StoreError> {
        Ok(self.profiles.read().await.get(name).cloned())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.profiles.read().await.len())
    }
}
