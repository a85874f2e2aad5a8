use std::collections::HashMap;
use std::sync::Arc;

/// Token for the on-screen preview of a pending source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(u64);

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Live preview handles of a session.
///
/// Every handle shares the source bytes instead of copying them. A handle
/// stays live until it is revoked; the session revokes handles when their
/// source is removed or the batch is replaced.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next_id: u64,
    live: HashMap<PreviewHandle, Arc<[u8]>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, bytes: Arc<[u8]>) -> PreviewHandle {
        self.next_id += 1;
        let handle = PreviewHandle(self.next_id);
        self.live.insert(handle, bytes);
        handle
    }

    /// Returns `false` if the handle was already revoked.
    pub fn revoke(&mut self, handle: PreviewHandle) -> bool {
        self.live.remove(&handle).is_some()
    }

    pub fn revoke_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        count
    }

    pub fn resolve(&self, handle: PreviewHandle) -> Option<Arc<[u8]>> {
        self.live.get(&handle).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
