use arc_swap::ArcSwap;
use ferrous_ipstack_domain::LinkStatus;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Shared view of whether the network interface is usable.
///
/// Readers are every resolution in flight; the only writer is the IP-task
/// event bridge. A down transition cancels the current abandonment token, so
/// anyone holding it wakes up immediately; an up transition installs a fresh
/// one for the resolutions that start afterwards.
#[derive(Clone)]
pub struct InterfaceState {
    inner: Arc<Inner>,
}

struct Inner {
    up: watch::Sender<bool>,
    abandon: ArcSwap<CancellationToken>,
}

impl InterfaceState {
    pub fn new(initial: LinkStatus) -> Self {
        let token = CancellationToken::new();
        if !initial.is_up() {
            token.cancel();
        }
        Self {
            inner: Arc::new(Inner {
                up: watch::channel(initial.is_up()).0,
                abandon: ArcSwap::from_pointee(token),
            }),
        }
    }

    pub fn is_up(&self) -> bool {
        *self.inner.up.borrow()
    }

    /// Resolve once the interface is up, immediately if it already is.
    pub async fn wait_until_up(&self) {
        let mut up = self.inner.up.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = up.wait_for(|up| *up).await;
    }

    pub fn status(&self) -> LinkStatus {
        if self.is_up() {
            LinkStatus::Up
        } else {
            LinkStatus::Down
        }
    }

    /// Token cancelled at the next down transition (already cancelled while
    /// the interface is down).
    pub fn abandon_token(&self) -> CancellationToken {
        self.inner.abandon.load_full().as_ref().clone()
    }

    /// Returns whether this call changed the state.
    pub(crate) fn set_down(&self) -> bool {
        let was_up = self.inner.up.send_replace(false);
        self.inner.abandon.load().cancel();
        was_up
    }

    /// Returns whether this call changed the state.
    pub(crate) fn set_up(&self) -> bool {
        if self.is_up() {
            return false;
        }
        self.inner
            .abandon
            .store(Arc::new(CancellationToken::new()));
        !self.inner.up.send_replace(true)
    }
}

impl std::fmt::Debug for InterfaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceState")
            .field("status", &self.status())
            .finish()
    }
}
