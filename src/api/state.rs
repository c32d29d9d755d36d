use std::sync::Arc;

use crate::config::FinancingConfig;
use crate::financing::FinancingService;
use crate::storage::{MemoryStore, TransactionManager};

/// Shared state for all handlers
pub struct AppState<M: TransactionManager> {
    pub financing: FinancingService<M>,
}

impl<M: TransactionManager> AppState<M> {
    pub fn new(financing: FinancingService<M>) -> Arc<Self> {
        Arc::new(Self { financing })
    }
}

impl AppState<MemoryStore> {
    pub fn from_store(store: MemoryStore, config: FinancingConfig) -> Arc<Self> {
        Self::new(FinancingService::with_memory_store(store, config))
    }
}
