//! Route changes issued by the edit flow.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

/// Destination after a successful update or a cancel.
pub const RECIPE_LIST_ROUTE: &str = "/recipelist";

/// Time the success notification stays on screen before navigating away.
pub const NAVIGATE_AFTER_SUCCESS: Duration = Duration::from_millis(2000);

pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: &str);
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn navigate(&self, route: &str) {
        (**self).navigate(route);
    }
}

/// Navigator that forwards routes to a channel owned by the front end.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: &str) {
        if self.tx.send(route.to_string()).is_err() {
            tracing::debug!("Navigation to {} dropped: no receiver", route);
        }
    }
}
