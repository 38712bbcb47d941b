//! # Event Bus Module
//!
//! Decoupled publish/subscribe channel between sessions, the scene, the
//! submit coordinator and whatever front end is watching them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use annokit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, SessionEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Session]),
//!     |event| {
//!         if let AppEvent::Session(e) = event {
//!             println!("session: {:?}", e);
//!         }
//!     },
//! );
//!
//! bus.publish(AppEvent::Session(SessionEvent::Mounted {
//!     session: "polygon".to_string(),
//! }));
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
