use ferrous_ipstack_domain::TransactionId;
use rustc_hash::FxHashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Hands out transaction identifiers that are unique among the requests
/// currently outstanding.
///
/// A wrapping counter seeded at random supplies candidates; identifiers still
/// in use are skipped. Each identifier is released when its guard drops.
#[derive(Clone)]
pub struct TransactionIds {
    state: Arc<Mutex<IdState>>,
}

struct IdState {
    next: TransactionId,
    live: FxHashSet<u16>,
}

impl TransactionIds {
    pub fn new() -> Self {
        Self::with_seed(fastrand::u16(..))
    }

    pub fn with_seed(seed: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(IdState {
                next: TransactionId(seed),
                live: FxHashSet::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IdState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `None` only when every identifier is outstanding.
    pub fn allocate(&self) -> Option<TransactionGuard> {
        let mut state = self.lock();
        for _ in 0..=u16::MAX as u32 {
            let candidate = state.next;
            state.next = candidate.wrapping_next();
            if state.live.insert(candidate.get()) {
                return Some(TransactionGuard {
                    state: Arc::clone(&self.state),
                    id: candidate,
                });
            }
        }
        None
    }

    pub fn outstanding(&self) -> usize {
        self.lock().live.len()
    }
}

impl Default for TransactionIds {
    fn default() -> Self {
        Self::new()
    }
}

/// An identifier reserved for one resolution sequence.
pub struct TransactionGuard {
    state: Arc<Mutex<IdState>>,
    id: TransactionId,
}

impl TransactionGuard {
    pub fn id(&self) -> TransactionId {
        self.id
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.live.remove(&self.id.get());
    }
}
