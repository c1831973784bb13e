//! Cached role lookup.

use std::collections::HashMap;
use std::sync::RwLock;

use jobboard_auth::RoleRecord;
use jobboard_core::RoleId;

use crate::store::{RoleStore, StoreError};

/// Resolves a role id to its record, caching hits in-process.
///
/// Roles are never mutated after creation, so cached entries never go stale.
#[derive(Debug, Default)]
pub struct RoleResolver {
    cache: RwLock<HashMap<RoleId, RoleRecord>>,
}

impl RoleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<S>(&self, store: &S, id: RoleId) -> Result<Option<RoleRecord>, StoreError>
    where
        S: RoleStore + ?Sized,
    {
        if let Some(role) = self.cache.read().ok().and_then(|c| c.get(&id).cloned()) {
            return Ok(Some(role));
        }

        let role = store.find_role(id)?;
        if let Some(role) = &role {
            if let Ok(mut cache) = self.cache.write() {
                cache.insert(id, role.clone());
            }
        }
        Ok(role)
    }
}
