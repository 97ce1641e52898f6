//! # Net Persistence
//!
//! Restores a net system by id. The index only needs read access; how nets
//! get into storage is the repository's business.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::model::{NetId, NetSystem};
use crate::{Error, Result};

/// Source of net systems to index.
pub trait NetRepository: Send + Sync {
    /// Load the net with the given id. The marking is whatever was stored;
    /// callers that need the natural marking compute it themselves.
    fn restore_net_system(&self, id: NetId) -> Result<NetSystem>;
}

/// In-memory net repository for testing and embedding.
#[derive(Clone, Default)]
pub struct MemoryNetRepository {
    nets: Arc<RwLock<HashMap<NetId, NetSystem>>>,
}

impl MemoryNetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a net under its own id, replacing any previous one.
    pub fn insert(&self, net: NetSystem) {
        self.nets.write().insert(net.id, net);
    }

    pub fn len(&self) -> usize {
        self.nets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.read().is_empty()
    }
}

impl NetRepository for MemoryNetRepository {
    fn restore_net_system(&self, id: NetId) -> Result<NetSystem> {
        self.nets.read().get(&id).cloned().ok_or(Error::NetNotFound(id))
    }
}
