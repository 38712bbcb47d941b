//! Event bus: synchronous handlers, async receivers and an optional
//! bounded log of recent events.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;

use super::events::{AppEvent, EventCategory};

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Which events a handler sees
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EventFilter {
    #[default]
    All,
    /// Any of the listed categories
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

/// Sizing of an [`EventBus`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Buffered events per async receiver before it lags
    pub channel_capacity: usize,
    /// Keep a log of recent events
    pub enable_history: bool,
    /// Oldest entries are dropped past this size
    pub max_history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            enable_history: false,
            max_history_size: 1000,
        }
    }
}

type Handler = Arc<dyn Fn(AppEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

/// Publish/subscribe hub shared by sessions, scenes and coordinators
pub struct EventBus {
    config: EventBusConfig,
    sender: broadcast::Sender<AppEvent>,
    subscriptions: RwLock<Vec<Subscription>>,
    next_id: AtomicU64,
    recent: Mutex<VecDeque<AppEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            config,
            sender,
            subscriptions: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// Deliver `event` and return how many handlers and receivers got it
    ///
    /// Handlers run on the calling thread after the subscription table is
    /// released, so a handler may publish or subscribe in turn. Nobody
    /// listening is not an error.
    pub fn publish(&self, event: AppEvent) -> usize {
        if self.config.enable_history {
            let mut recent = self.recent.lock();
            recent.push_back(event.clone());
            let excess = recent.len().saturating_sub(self.config.max_history_size);
            recent.drain(..excess);
        }

        let handlers: Vec<Handler> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| s.handler.clone())
            .collect();

        tracing::trace!(
            "{} -> {} handler(s): {}",
            event.category(),
            handlers.len(),
            event.description()
        );
        for handler in &handlers {
            handler(event.clone());
        }

        handlers.len() + self.sender.send(event).unwrap_or(0)
    }

    /// Register a handler called synchronously for every matching event
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!("Event subscription {} added", id);
        id
    }

    /// Remove a handler. False if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() != before;
        if removed {
            tracing::debug!("Event subscription {} removed", id);
        }
        removed
    }

    /// Receiver for consuming events from an async task
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Logged events, oldest first. Empty unless history is enabled.
    pub fn history(&self) -> Vec<AppEvent> {
        self.recent.lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.recent.lock().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

static GLOBAL_BUS: OnceLock<Arc<EventBus>> = OnceLock::new();

/// Process-wide bus used by the binary
///
/// Library code takes an explicit `Arc<EventBus>` instead.
pub fn event_bus() -> Arc<EventBus> {
    GLOBAL_BUS.get_or_init(|| Arc::new(EventBus::new())).clone()
}

/// Configure the process-wide bus before first use
///
/// Hands the configuration back if the bus already exists.
pub fn init_event_bus(config: EventBusConfig) -> Result<(), EventBusConfig> {
    let mut rejected = Some(config.clone());
    GLOBAL_BUS.get_or_init(|| {
        rejected = None;
        Arc::new(EventBus::with_config(config))
    });
    match rejected {
        None => Ok(()),
        Some(config) => Err(config),
    }
}
