use crate::models::api::LogEvent;
use crate::models::config::Config;
use crate::repo::sqlite::LogStore;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the change notification channel
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The log database; all concurrency control lives inside it
    store: LogStore,

    /// Configuration the server was started with
    config: Arc<Config>,

    /// Change notifications for connected UIs (SSE)
    events: broadcast::Sender<LogEvent>,
}

impl AppState {
    /// Create a new application state
    pub fn new(store: LogStore, config: Config) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            config: Arc::new(config),
            events,
        }
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribe to log change events
    pub fn subscribe_events(&self) -> broadcast::Receiver<LogEvent> {
        self.events.subscribe()
    }

    /// Notify all subscribers; having none is fine
    pub fn notify(&self, event: LogEvent) {
        let _ = self.events.send(event);
    }
}
