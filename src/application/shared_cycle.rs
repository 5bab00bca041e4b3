//! Shared ownership of the current workflow cycle.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::cycle::WorkflowCycle;

/// The one active cycle, shared by the stream loops and user actions.
///
/// Every user action and every decoded event takes the write lock for the
/// duration of one state change, so actions are applied one at a time.
#[derive(Debug, Clone, Default)]
pub struct SharedCycle {
    inner: Arc<RwLock<WorkflowCycle>>,
}

impl SharedCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, WorkflowCycle> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, WorkflowCycle> {
        self.inner.write().await
    }
}
